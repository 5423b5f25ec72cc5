use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::repository::{AdvertRepository, CategoryRepository, LocationRepository, UserRepository};
use crate::services::MediaStore;

/// Everything the handlers share
pub struct AppState {
    pub pool: PgPool,
    pub adverts: AdvertRepository,
    pub categories: CategoryRepository,
    pub users: UserRepository,
    pub locations: LocationRepository,
    pub media: MediaStore,
    pub page_size: i64,
    pub max_upload_bytes: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            adverts: AdvertRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            locations: LocationRepository::new(pool.clone()),
            media: MediaStore::new(config.media_root.clone(), &config.media_url),
            page_size: config.page_size,
            max_upload_bytes: config.max_upload_bytes,
            pool,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
