use bigdecimal::BigDecimal;
use sqlx::{PgConnection, PgPool};

use crate::error::{ApiError, Result};
use crate::models::{Location, LocationPatch, NewLocation};
use crate::search::{Page, Paginated};
use crate::services::validation::validate_location_patch;
use crate::services::validate_new_location;

#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, page: Option<&str>, page_size: i64) -> Result<Paginated<Location>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
            .fetch_one(&self.pool)
            .await?;

        let page = Page::resolve(page, page_size, total);

        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, name, lat, lng FROM locations ORDER BY name, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(page.wrap(locations))
    }

    pub async fn read(&self, id: i64) -> Result<Location> {
        sqlx::query_as::<_, Location>("SELECT id, name, lat, lng FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn create(&self, location: NewLocation) -> Result<Location> {
        let location = validate_new_location(location)?;

        let mut conn = self.pool.acquire().await?;
        let created = insert_location(&mut conn, &location.name, &location.lat, &location.lng).await?;

        tracing::info!(location_id = created.id, name = %created.name, "Created location");

        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: LocationPatch) -> Result<Location> {
        let patch = validate_location_patch(patch)?;

        let mut conn = self.pool.acquire().await?;
        let updated = update_location(&mut conn, id, &patch)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Location {} not found", id)))?;

        tracing::info!(location_id = id, "Updated location");

        Ok(updated)
    }

    /// Delete a location; users referencing it are detached by the store
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Location {} not found", id)));
        }

        tracing::info!(location_id = id, "Deleted location");

        Ok(())
    }
}

pub(crate) async fn insert_location(
    conn: &mut PgConnection,
    name: &str,
    lat: &BigDecimal,
    lng: &BigDecimal,
) -> Result<Location> {
    let location = sqlx::query_as::<_, Location>(
        "INSERT INTO locations (name, lat, lng) VALUES ($1, $2, $3) RETURNING id, name, lat, lng",
    )
    .bind(name)
    .bind(lat)
    .bind(lng)
    .fetch_one(&mut *conn)
    .await?;

    Ok(location)
}

/// Applies a partial update; `None` when the location does not exist
pub(crate) async fn update_location(
    conn: &mut PgConnection,
    id: i64,
    patch: &LocationPatch,
) -> Result<Option<Location>> {
    let location = sqlx::query_as::<_, Location>(
        r#"
        UPDATE locations
        SET
            name = COALESCE($2, name),
            lat = COALESCE($3, lat),
            lng = COALESCE($4, lng)
        WHERE id = $1
        RETURNING id, name, lat, lng
        "#,
    )
    .bind(id)
    .bind(patch.name.as_deref())
    .bind(patch.lat.as_ref())
    .bind(patch.lng.as_ref())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(location)
}
