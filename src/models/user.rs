use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::location::LocationPatch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Moderator,
    Admin,
}

/// A user as exposed by the API. The password hash is never loaded into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Role,
    pub age: i16,
    pub location_id: Option<i64>,
    /// Name of the attached location
    pub location: Option<String>,
    /// Number of published adverts authored by the user
    pub adverts: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub age: i16,
    pub location: Option<String>,
    pub lat: Option<BigDecimal>,
    pub lng: Option<BigDecimal>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    /// `Some(None)` clears the last name
    #[serde(default, deserialize_with = "super::nullable")]
    pub last_name: Option<Option<String>>,
    pub role: Option<Role>,
    pub age: Option<i16>,
    pub location: Option<String>,
    pub lat: Option<BigDecimal>,
    pub lng: Option<BigDecimal>,
    /// `Some(None)` detaches the current location
    #[serde(default, deserialize_with = "super::nullable")]
    pub location_id: Option<Option<i64>>,
}

/// How a create or update request wants the user's location resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRef {
    /// Attach an existing location by id
    Id(i64),
    /// Attach the existing location with this name
    Named(String),
    /// Create a new location and attach it
    Create {
        name: String,
        lat: BigDecimal,
        lng: BigDecimal,
    },
    /// Edit the currently attached location (falls back to `Create` or
    /// `Named` when the user has none)
    Edit(LocationPatch),
    /// Detach the current location, leaving the location itself in place
    Detach,
}
