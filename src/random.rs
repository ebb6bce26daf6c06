use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, instrument};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/random", get(random_number))
}

/// Thin pass-through to a third-party random-number service.
#[instrument(skip(state))]
pub async fn random_number(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = reqwest::get(&state.config.random_api_url)
        .await
        .map_err(|e| {
            error!(error = %e, "random upstream request failed");
            ApiError::Internal(e.to_string())
        })?
        .json::<serde_json::Value>()
        .await
        .map_err(|e| {
            error!(error = %e, "random upstream returned non-json");
            ApiError::Internal(e.to_string())
        })?;
    Ok(Json(body))
}
