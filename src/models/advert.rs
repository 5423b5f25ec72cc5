use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::MediaStore;

/// An advert row joined with its author's username and category names.
#[derive(Debug, Clone, FromRow)]
pub struct Advert {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author: String,
    pub price: i32,
    pub description: Option<String>,
    pub is_published: bool,
    /// Storage path relative to the media root
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<String>,
}

/// JSON representation of an advert, with the image resolved to a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertView {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author: String,
    pub price: i32,
    pub description: Option<String>,
    pub is_published: bool,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Advert {
    pub fn into_view(self, media: &MediaStore) -> AdvertView {
        AdvertView {
            image: self.image.as_deref().map(|path| media.url(path)),
            id: self.id,
            name: self.name,
            author_id: self.author_id,
            author: self.author,
            price: self.price,
            description: self.description,
            is_published: self.is_published,
            categories: self.categories,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAdvert {
    pub name: String,
    pub author_id: i64,
    pub price: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    /// Category names; unknown names are created
    #[serde(default, alias = "categories")]
    pub category_id: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvertPatch {
    pub name: Option<String>,
    pub author_id: Option<i64>,
    pub price: Option<i32>,
    /// `Some(None)` clears the description
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    pub is_published: Option<bool>,
    /// When present, replaces the whole category set
    #[serde(alias = "categories")]
    pub category_id: Option<Vec<String>>,
}

/// Response of the image upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvertImage {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
}
