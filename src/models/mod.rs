pub mod advert;
pub mod category;
pub mod location;
pub mod user;

pub use advert::{Advert, AdvertImage, AdvertPatch, AdvertView, NewAdvert};
pub use category::{Category, CategoryInput};
pub use location::{Location, LocationPatch, NewLocation};
pub use user::{LocationRef, NewUser, Role, User, UserPatch};

use serde::{Deserialize, Deserializer};

/// Deserializes a patch field so that an explicit `null` is kept apart from
/// an absent field: absent is `None` (via `#[serde(default)]`), `null` is
/// `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
