use bigdecimal::BigDecimal;

use crate::error::{ApiError, Result};
use crate::models::{
    AdvertPatch, LocationPatch, LocationRef, NewAdvert, NewLocation, NewUser, Role, UserPatch,
};
use crate::validation::{optional_text, require_non_negative, require_text};

pub const ADVERT_NAME_MAX: usize = 250;
pub const ADVERT_DESCRIPTION_MAX: usize = 1000;
pub const CATEGORY_NAME_MAX: usize = 20;
pub const LOCATION_NAME_MAX: usize = 100;
pub const USER_NAME_MAX: usize = 50;

/// Trims category names, rejects blank ones and drops duplicates while
/// keeping first-seen order.
pub fn normalize_category_names(names: Vec<String>) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(names.len());

    for name in names {
        let name = require_text("category name", &name, CATEGORY_NAME_MAX)?;
        if !normalized.contains(&name) {
            normalized.push(name);
        }
    }

    Ok(normalized)
}

pub fn validate_category_name(name: &str) -> Result<String> {
    require_text("name", name, CATEGORY_NAME_MAX)
}

/// Validates an advert create request, returning it with trimmed fields.
pub fn validate_new_advert(advert: NewAdvert) -> Result<NewAdvert> {
    require_non_negative("price", advert.price as i64)?;

    Ok(NewAdvert {
        name: require_text("name", &advert.name, ADVERT_NAME_MAX)?,
        description: optional_text("description", advert.description.as_deref(), ADVERT_DESCRIPTION_MAX)?,
        category_id: normalize_category_names(advert.category_id)?,
        ..advert
    })
}

pub fn validate_advert_patch(patch: AdvertPatch) -> Result<AdvertPatch> {
    if let Some(price) = patch.price {
        require_non_negative("price", price as i64)?;
    }

    Ok(AdvertPatch {
        name: patch
            .name
            .as_deref()
            .map(|name| require_text("name", name, ADVERT_NAME_MAX))
            .transpose()?,
        description: patch
            .description
            .map(|d| optional_text("description", d.as_deref(), ADVERT_DESCRIPTION_MAX))
            .transpose()?,
        category_id: patch.category_id.map(normalize_category_names).transpose()?,
        ..patch
    })
}

pub fn validate_coordinates(lat: Option<&BigDecimal>, lng: Option<&BigDecimal>) -> Result<()> {
    if let Some(lat) = lat {
        if *lat < BigDecimal::from(-90) || *lat > BigDecimal::from(90) {
            return Err(ApiError::ValidationError(format!(
                "lat must be between -90 and 90, got {}",
                lat
            )));
        }
    }
    if let Some(lng) = lng {
        if *lng < BigDecimal::from(-180) || *lng > BigDecimal::from(180) {
            return Err(ApiError::ValidationError(format!(
                "lng must be between -180 and 180, got {}",
                lng
            )));
        }
    }
    Ok(())
}

pub fn validate_new_location(location: NewLocation) -> Result<NewLocation> {
    validate_coordinates(Some(&location.lat), Some(&location.lng))?;
    Ok(NewLocation {
        name: require_text("name", &location.name, LOCATION_NAME_MAX)?,
        ..location
    })
}

pub fn validate_location_patch(patch: LocationPatch) -> Result<LocationPatch> {
    validate_coordinates(patch.lat.as_ref(), patch.lng.as_ref())?;
    Ok(LocationPatch {
        name: patch
            .name
            .as_deref()
            .map(|name| require_text("location", name, LOCATION_NAME_MAX))
            .transpose()?,
        ..patch
    })
}

/// Decides how inline location fields of a new user (or of a user without a
/// location) attach a location: name plus both coordinates creates one, a
/// bare name refers to an existing one.
pub fn location_ref_for_new(patch: LocationPatch) -> Result<Option<LocationRef>> {
    let patch = validate_location_patch(patch)?;

    match (patch.name, patch.lat, patch.lng) {
        (None, None, None) => Ok(None),
        (Some(name), Some(lat), Some(lng)) => Ok(Some(LocationRef::Create { name, lat, lng })),
        (Some(name), None, None) => Ok(Some(LocationRef::Named(name))),
        (None, _, _) => Err(ApiError::ValidationError(
            "location name is required together with lat and lng".to_string(),
        )),
        (Some(_), _, _) => Err(ApiError::ValidationError(
            "lat and lng must be provided together".to_string(),
        )),
    }
}

/// A validated user create request
#[derive(Debug, Clone)]
pub struct ValidUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Role,
    pub age: i16,
    pub location: Option<LocationRef>,
}

pub fn validate_new_user(user: NewUser) -> Result<ValidUser> {
    require_non_negative("age", user.age as i64)?;
    let password = require_password(&user.password)?;

    let location = match user.location_id {
        Some(id) => Some(LocationRef::Id(id)),
        None => location_ref_for_new(LocationPatch {
            name: user.location,
            lat: user.lat,
            lng: user.lng,
        })?,
    };

    Ok(ValidUser {
        username: require_text("username", &user.username, USER_NAME_MAX)?,
        password,
        first_name: require_text("first_name", &user.first_name, USER_NAME_MAX)?,
        last_name: optional_text("last_name", user.last_name.as_deref(), USER_NAME_MAX)?,
        role: user.role.unwrap_or_default(),
        age: user.age,
        location,
    })
}

/// A validated partial user update
#[derive(Debug, Clone, Default)]
pub struct ValidUserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    /// `Some(None)` clears the stored value
    pub last_name: Option<Option<String>>,
    pub role: Option<Role>,
    pub age: Option<i16>,
    pub location: Option<LocationRef>,
}

pub fn validate_user_patch(patch: UserPatch) -> Result<ValidUserPatch> {
    if let Some(age) = patch.age {
        require_non_negative("age", age as i64)?;
    }

    let location_patch = LocationPatch {
        name: patch.location,
        lat: patch.lat,
        lng: patch.lng,
    };
    let location = match patch.location_id {
        Some(Some(id)) => Some(LocationRef::Id(id)),
        Some(None) => Some(LocationRef::Detach),
        None if location_patch.is_empty() => None,
        None => Some(LocationRef::Edit(validate_location_patch(location_patch)?)),
    };

    Ok(ValidUserPatch {
        username: patch
            .username
            .as_deref()
            .map(|v| require_text("username", v, USER_NAME_MAX))
            .transpose()?,
        password: patch.password.as_deref().map(require_password).transpose()?,
        first_name: patch
            .first_name
            .as_deref()
            .map(|v| require_text("first_name", v, USER_NAME_MAX))
            .transpose()?,
        last_name: patch
            .last_name
            .map(|v| optional_text("last_name", v.as_deref(), USER_NAME_MAX))
            .transpose()?,
        role: patch.role,
        age: patch.age,
        location,
    })
}

fn require_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(ApiError::ValidationError("password must not be empty".to_string()));
    }
    Ok(password.to_string())
}
