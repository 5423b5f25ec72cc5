use sqlx::PgPool;

use crate::error::{ApiError, Result};
use crate::models::Category;
use crate::search::{Page, Paginated};
use crate::services::validate_category_name;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List categories ordered by name
    pub async fn list(&self, page: Option<&str>, page_size: i64) -> Result<Paginated<Category>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        let page = Page::resolve(page, page_size, total);

        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(page.wrap(categories))
    }

    pub async fn read(&self, id: i64) -> Result<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Category {} not found", id)))
    }

    /// Create a category; an existing name is a conflict
    pub async fn create(&self, name: &str) -> Result<Category> {
        let name = validate_category_name(name)?;

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(category_id = category.id, name = %category.name, "Created category");

        Ok(category)
    }

    pub async fn update(&self, id: i64, name: &str) -> Result<Category> {
        let name = validate_category_name(name)?;

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!(category_id = id, name = %category.name, "Renamed category");

        Ok(category)
    }

    /// Delete a category. Adverts keep existing; only their association
    /// rows go.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!(category_id = id, "Deleted category");

        Ok(())
    }
}
