use sqlx::{PgConnection, PgPool};

use crate::error::{ApiError, Result};
use crate::models::{LocationRef, NewUser, User, UserPatch};
use crate::repository::location::{insert_location, update_location};
use crate::search::{Page, Paginated};
use crate::services::validation::location_ref_for_new;
use crate::services::{hash_password, validate_new_user, validate_user_patch};

/// Columns of the public user view: location name resolved, published
/// adverts counted.
const USER_SELECT: &str = r#"
    SELECT
        u.id, u.username, u.first_name, u.last_name, u.role, u.age, u.location_id,
        l.name AS location,
        (
            SELECT COUNT(*) FROM adverts a
            WHERE a.author_id = u.id AND a.is_published
        ) AS adverts
    FROM users u
    LEFT JOIN locations l ON l.id = u.location_id
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users ordered by username
    pub async fn list(&self, page: Option<&str>, page_size: i64) -> Result<Paginated<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let page = Page::resolve(page, page_size, total);

        let sql = format!("{} ORDER BY u.username, u.id LIMIT $1 OFFSET $2", USER_SELECT);
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(page.wrap(users))
    }

    pub async fn read(&self, id: i64) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    /// Create a user, hashing the password and attaching or creating its
    /// location in the same transaction
    pub async fn create(&self, user: NewUser) -> Result<User> {
        let user = validate_new_user(user)?;
        let password_hash = hash_password(user.password).await?;

        let mut tx = self.pool.begin().await?;

        let location_id = match user.location {
            Some(location) => Some(resolve_location(&mut tx, location).await?),
            None => None,
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, role, age, location_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&password_hash)
        .bind(&user.first_name)
        .bind(user.last_name.as_deref())
        .bind(user.role)
        .bind(user.age)
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await?;

        let created = fetch_user(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

        tx.commit().await?;

        tracing::info!(user_id = id, username = %created.username, "Created user");

        Ok(created)
    }

    /// Partially update a user. Inline location fields edit the attached
    /// location in place, or attach one when the user has none. A null
    /// `location_id` detaches the location.
    pub async fn update(&self, id: i64, patch: UserPatch) -> Result<User> {
        let patch = validate_user_patch(patch)?;
        let password_hash = match patch.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let current_location: Option<i64> =
            sqlx::query_scalar("SELECT location_id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

        let location_id = match (patch.location, current_location) {
            (None, current) => current,
            (Some(LocationRef::Detach), _) => None,
            (Some(LocationRef::Edit(location_patch)), Some(current)) => {
                update_location(&mut tx, current, &location_patch)
                    .await?
                    .ok_or_else(|| ApiError::NotFound(format!("Location {} not found", current)))?;
                Some(current)
            }
            (Some(LocationRef::Edit(location_patch)), None) => {
                match location_ref_for_new(location_patch)? {
                    Some(location) => Some(resolve_location(&mut tx, location).await?),
                    None => None,
                }
            }
            (Some(location), _) => Some(resolve_location(&mut tx, location).await?),
        };

        sqlx::query(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                first_name = COALESCE($4, first_name),
                last_name = CASE WHEN $5 THEN $6 ELSE last_name END,
                role = COALESCE($7, role),
                age = COALESCE($8, age),
                location_id = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.username.as_deref())
        .bind(password_hash.as_deref())
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.is_some())
        .bind(patch.last_name.as_ref().and_then(|v| v.as_deref()))
        .bind(patch.role)
        .bind(patch.age)
        .bind(location_id)
        .execute(&mut *tx)
        .await?;

        let updated = fetch_user(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

        tx.commit().await?;

        tracing::info!(user_id = id, "Updated user");

        Ok(updated)
    }

    /// Delete a user together with its adverts. Returns the image paths of
    /// the removed adverts so the caller can drop the files.
    pub async fn delete(&self, id: i64) -> Result<Vec<String>> {
        let mut tx = self.pool.begin().await?;

        let images: Vec<String> = sqlx::query_scalar(
            "SELECT image FROM adverts WHERE author_id = $1 AND image IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("User {} not found", id)));
        }

        tx.commit().await?;

        tracing::info!(user_id = id, orphaned_images = images.len(), "Deleted user and their adverts");

        Ok(images)
    }

    /// Stored password hash. No endpoint exposes it; it exists as test
    /// support for checking that passwords are stored hashed.
    pub async fn password_hash(&self, id: i64) -> Result<String> {
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }
}

async fn fetch_user(conn: &mut PgConnection, id: i64) -> Result<Option<User>> {
    let sql = format!("{} WHERE u.id = $1", USER_SELECT);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

/// Resolves a location reference to the id to attach
async fn resolve_location(conn: &mut PgConnection, location: LocationRef) -> Result<i64> {
    match location {
        LocationRef::Id(id) => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM locations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Location {} not found", id)))
        }
        LocationRef::Named(name) => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM locations WHERE name = $1 ORDER BY id LIMIT 1")
                .bind(&name)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Location '{}' not found", name)))
        }
        LocationRef::Create { name, lat, lng } => {
            let location = insert_location(conn, &name, &lat, &lng).await?;
            tracing::debug!(location_id = location.id, "Created location inline");
            Ok(location.id)
        }
        LocationRef::Edit(_) | LocationRef::Detach => Err(ApiError::ValidationError(
            "location name, lat and lng are required to create a location".to_string(),
        )),
    }
}
