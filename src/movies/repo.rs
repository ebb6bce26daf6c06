use sqlx::PgPool;

use crate::error::ApiError;
use crate::movies::dto::MoviePayload;
use crate::movies::repo_types::Movie;

impl Movie {
    /// Owner is always the resolved identity of the request, never the
    /// payload.
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        payload: &MoviePayload,
    ) -> Result<Movie, ApiError> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (user_id, title, score, description, review, is_private)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, score, description, review, is_private, created_at
            "#,
        )
        .bind(user_id)
        .bind(&payload.title)
        .bind(payload.score)
        .bind(&payload.description)
        .bind(&payload.review)
        .bind(payload.is_private)
        .fetch_one(db)
        .await?;
        Ok(movie)
    }

    pub async fn list_public(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Movie>, ApiError> {
        let rows = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, user_id, title, score, description, review, is_private, created_at
            FROM movies
            WHERE is_private = FALSE
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// One visibility slice of the caller's own reviews, never a combined
    /// view.
    pub async fn list_by_owner(
        db: &PgPool,
        user_id: i64,
        is_private: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Movie>, ApiError> {
        let rows = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, user_id, title, score, description, review, is_private, created_at
            FROM movies
            WHERE user_id = $1 AND is_private = $2
            ORDER BY id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(is_private)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Full overwrite, filtered by id AND owner in one statement. A zero row
    /// count covers both "no such id" and "not yours" so the caller cannot
    /// probe for foreign records.
    pub async fn update_owned(
        db: &PgPool,
        id: i64,
        user_id: i64,
        payload: &MoviePayload,
    ) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $1, score = $2, description = $3, review = $4, is_private = $5
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(&payload.title)
        .bind(payload.score)
        .bind(&payload.description)
        .bind(&payload.review)
        .bind(payload.is_private)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_owned(db: &PgPool, id: i64, user_id: i64) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
