use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Movie review record. Every review has exactly one owner and defaults to
/// private.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub score: f64,
    pub description: String,
    pub review: String,
    pub is_private: bool,
    pub created_at: OffsetDateTime,
}
