use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub lat: BigDecimal,
    pub lng: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub lat: BigDecimal,
    pub lng: BigDecimal,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub lat: Option<BigDecimal>,
    pub lng: Option<BigDecimal>,
}

impl LocationPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.lat.is_none() && self.lng.is_none()
    }
}
