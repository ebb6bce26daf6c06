use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::movies::repo_types::Movie;

/// Request body for creating or fully replacing a review.
#[derive(Debug, Deserialize)]
pub struct MoviePayload {
    pub title: String,
    pub score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub review: String,
    #[serde(default = "default_private")]
    pub is_private: bool,
}

fn default_private() -> bool {
    true
}

/// Returned after creating a review.
#[derive(Debug, Serialize)]
pub struct CreatedMovie {
    pub title: String,
}

/// Review as returned by the listing endpoints.
#[derive(Debug, Serialize)]
pub struct MovieItem {
    pub id: i64,
    pub title: String,
    pub score: f64,
    pub description: String,
    pub review: String,
    pub is_private: bool,
    pub created_at: OffsetDateTime,
}

impl From<Movie> for MovieItem {
    fn from(m: Movie) -> Self {
        Self {
            id: m.id,
            title: m.title,
            score: m.score,
            description: m.description,
            review: m.review,
            is_private: m.is_private,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Filter for the owner-scoped listing; the caller picks exactly one
/// visibility slice of their own reviews.
#[derive(Debug, Deserialize)]
pub struct OwnMoviesQuery {
    pub is_private: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn reviews_default_to_private() {
        let payload: MoviePayload =
            serde_json::from_str(r#"{"title": "Avatar", "score": 8.3}"#).unwrap();
        assert!(payload.is_private);
        assert_eq!(payload.description, "");
        assert_eq!(payload.review, "");
    }

    #[test]
    fn own_listing_filter_requires_the_visibility_flag() {
        assert!(serde_json::from_str::<OwnMoviesQuery>("{}").is_err());
        let q: OwnMoviesQuery = serde_json::from_str(r#"{"is_private": false}"#).unwrap();
        assert!(!q.is_private);
        assert_eq!(q.limit, 20);
    }
}
