use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Body of both category create and update
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}
