use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::{ApiError, Result};
use crate::models::{Advert, AdvertPatch, NewAdvert};
use crate::search::{like_pattern, AdvertQuery, Page, Paginated};
use crate::services::{validate_advert_patch, validate_new_advert};

/// Advert columns joined with the author's username and the sorted
/// category names. The location join backs the `location` filter.
const ADVERT_SELECT: &str = r#"
    SELECT
        a.id, a.name, a.author_id, u.username AS author, a.price, a.description,
        a.is_published, a.image, a.created_at,
        ARRAY(
            SELECT c.name::text
            FROM advert_categories ac
            JOIN categories c ON c.id = ac.category_id
            WHERE ac.advert_id = a.id
            ORDER BY c.name
        ) AS categories
    FROM adverts a
    JOIN users u ON u.id = a.author_id
    LEFT JOIN locations l ON l.id = u.location_id
"#;

const ADVERT_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM adverts a
    JOIN users u ON u.id = a.author_id
    LEFT JOIN locations l ON l.id = u.location_id
"#;

#[derive(Clone)]
pub struct AdvertRepository {
    pool: PgPool,
}

impl AdvertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, ordered and paginated advert list
    pub async fn list(&self, query: &AdvertQuery, page_size: i64) -> Result<Paginated<Advert>> {
        let mut count = QueryBuilder::<Postgres>::new(ADVERT_COUNT);
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let page = Page::resolve(query.page.as_deref(), page_size, total);

        let mut select = QueryBuilder::<Postgres>::new(ADVERT_SELECT);
        push_filters(&mut select, query);
        select.push(format!(
            " ORDER BY {} {}, a.id ASC",
            query.sort.field.column(),
            query.sort.direction.sql()
        ));
        select.push(" LIMIT ").push_bind(page.limit());
        select.push(" OFFSET ").push_bind(page.offset());

        let adverts = select.build_query_as::<Advert>().fetch_all(&self.pool).await?;

        tracing::debug!(total, page = page.number, returned = adverts.len(), "Listed adverts");

        Ok(page.wrap(adverts))
    }

    pub async fn read(&self, id: i64) -> Result<Advert> {
        let mut conn = self.pool.acquire().await?;
        fetch_advert(&mut conn, id)
            .await?
            .ok_or_else(|| advert_not_found(id))
    }

    /// Create an advert and its category associations in one transaction
    pub async fn create(&self, advert: NewAdvert) -> Result<Advert> {
        let advert = validate_new_advert(advert)?;

        let mut tx = self.pool.begin().await?;

        ensure_user_exists(&mut tx, advert.author_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO adverts (name, author_id, price, description, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&advert.name)
        .bind(advert.author_id)
        .bind(advert.price)
        .bind(advert.description.as_deref())
        .bind(advert.is_published)
        .fetch_one(&mut *tx)
        .await?;

        replace_categories(&mut tx, id, &advert.category_id).await?;

        let created = fetch_advert(&mut tx, id)
            .await?
            .ok_or_else(|| advert_not_found(id))?;

        tx.commit().await?;

        tracing::info!(
            advert_id = id,
            author_id = created.author_id,
            categories = created.categories.len(),
            "Created advert"
        );

        Ok(created)
    }

    /// Partially update an advert. A present category list replaces the
    /// whole association set; an explicit null description clears it.
    pub async fn update(&self, id: i64, patch: AdvertPatch) -> Result<Advert> {
        let patch = validate_advert_patch(patch)?;

        let mut tx = self.pool.begin().await?;

        lock_advert(&mut tx, id).await?;

        if let Some(author_id) = patch.author_id {
            ensure_user_exists(&mut tx, author_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE adverts
            SET
                name = COALESCE($2, name),
                author_id = COALESCE($3, author_id),
                price = COALESCE($4, price),
                description = CASE WHEN $5 THEN $6 ELSE description END,
                is_published = COALESCE($7, is_published)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.author_id)
        .bind(patch.price)
        .bind(patch.description.is_some())
        .bind(patch.description.as_ref().and_then(|d| d.as_deref()))
        .bind(patch.is_published)
        .execute(&mut *tx)
        .await?;

        if let Some(names) = &patch.category_id {
            replace_categories(&mut tx, id, names).await?;
        }

        let updated = fetch_advert(&mut tx, id)
            .await?
            .ok_or_else(|| advert_not_found(id))?;

        tx.commit().await?;

        tracing::info!(advert_id = id, "Updated advert");

        Ok(updated)
    }

    /// Point the advert at a newly stored image. Returns the updated advert
    /// and the previous image path.
    pub async fn set_image(&self, id: i64, path: &str) -> Result<(Advert, Option<String>)> {
        let mut tx = self.pool.begin().await?;

        let previous = lock_advert(&mut tx, id).await?;

        sqlx::query("UPDATE adverts SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(&mut *tx)
            .await?;

        let updated = fetch_advert(&mut tx, id)
            .await?
            .ok_or_else(|| advert_not_found(id))?;

        tx.commit().await?;

        tracing::info!(advert_id = id, image = %path, "Attached advert image");

        Ok((updated, previous))
    }

    /// Delete an advert; returns its image path, if any
    pub async fn delete(&self, id: i64) -> Result<Option<String>> {
        let image: Option<String> =
            sqlx::query_scalar("DELETE FROM adverts WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| advert_not_found(id))?;

        tracing::info!(advert_id = id, "Deleted advert");

        Ok(image)
    }
}

fn advert_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Advert {} not found", id))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AdvertQuery) {
    builder.push(" WHERE TRUE");

    if let Some(category_id) = query.category_id {
        builder
            .push(" AND EXISTS (SELECT 1 FROM advert_categories ac WHERE ac.advert_id = a.id AND ac.category_id = ")
            .push_bind(category_id)
            .push(")");
    }
    if let Some(text) = &query.text {
        builder.push(" AND a.name ILIKE ").push_bind(like_pattern(text));
    }
    if let Some(location) = &query.location {
        builder.push(" AND l.name ILIKE ").push_bind(like_pattern(location));
    }
    if let Some(price_from) = query.price_from {
        builder.push(" AND a.price >= ").push_bind(price_from);
    }
    if let Some(price_to) = query.price_to {
        builder.push(" AND a.price <= ").push_bind(price_to);
    }
    if let Some(is_published) = query.is_published {
        builder.push(" AND a.is_published = ").push_bind(is_published);
    }
}

async fn fetch_advert(conn: &mut PgConnection, id: i64) -> Result<Option<Advert>> {
    let sql = format!("{} WHERE a.id = $1", ADVERT_SELECT);
    let advert = sqlx::query_as::<_, Advert>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(advert)
}

/// Locks the advert row for the rest of the transaction and returns its
/// current image path
async fn lock_advert(conn: &mut PgConnection, id: i64) -> Result<Option<String>> {
    let image: Option<String> = sqlx::query_scalar("SELECT image FROM adverts WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| advert_not_found(id))?;
    Ok(image)
}

async fn ensure_user_exists(conn: &mut PgConnection, user_id: i64) -> Result<()> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR SHARE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))?;
    Ok(())
}

/// Makes the advert's categories exactly `names`, creating unknown names.
async fn replace_categories(conn: &mut PgConnection, advert_id: i64, names: &[String]) -> Result<()> {
    sqlx::query("DELETE FROM advert_categories WHERE advert_id = $1")
        .bind(advert_id)
        .execute(&mut *conn)
        .await?;

    if names.is_empty() {
        return Ok(());
    }

    let created = sqlx::query(
        "INSERT INTO categories (name) SELECT unnest($1::text[]) ON CONFLICT (name) DO NOTHING",
    )
    .bind(names)
    .execute(&mut *conn)
    .await?;

    if created.rows_affected() > 0 {
        tracing::debug!(advert_id, created = created.rows_affected(), "Created categories by name");
    }

    sqlx::query(
        r#"
        INSERT INTO advert_categories (advert_id, category_id)
        SELECT $1, c.id FROM categories c WHERE c.name = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(advert_id)
    .bind(names)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
