use sqlx::PgPool;

use crate::auth::repo_types::User;
use crate::error::ApiError;

/// Maps a unique-index rejection from the INSERT/UPDATE itself into a
/// conflict. There is deliberately no SELECT-then-INSERT pre-check: two
/// concurrent registrations with the same email must both reach the index and
/// exactly one of them must get the conflict.
fn map_unique(e: sqlx::Error) -> ApiError {
    if e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
    {
        ApiError::Conflict("email already registered".into())
    } else {
        ApiError::from(e)
    }
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, is_staff, is_superuser, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, is_staff, is_superuser, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, is_active, is_staff, is_superuser, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(map_unique)?;
        Ok(user)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, is_staff, is_superuser, created_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Full overwrite of the payload-carried fields. Returns the number of
    /// rows touched; zero means the id does not exist.
    pub async fn update(
        db: &PgPool,
        id: i64,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $1, password_hash = $2
            WHERE id = $3
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(id)
        .execute(db)
        .await
        .map_err(map_unique)?;
        Ok(result.rows_affected())
    }

    /// Reviews owned by the account go with it (ON DELETE CASCADE).
    pub async fn delete(db: &PgPool, id: i64) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
