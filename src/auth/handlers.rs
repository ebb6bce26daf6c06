use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{CreatedUser, LoginRequest, LoginResponse, PublicUser, UserPayload},
        repo_types::User,
        services::{hash_password, validate_email, validate_password, verify_password, JwtKeys},
    },
    error::ApiError,
    movies::dto::Pagination,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/create-user", post(create_user))
        .route("/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<CreatedUser>, ApiError> {
    // Both checks run before anything touches the database.
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e.to_string())
    })?;

    // Uniqueness is left to the unique index; the INSERT itself surfaces the
    // conflict, so concurrent registrations cannot both slip past a pre-check.
    let user = User::create(&state.db, &email, &hash).await?;

    info!(user_id = user.id, email = %user.email, "account created");
    Ok(Json(CreatedUser {
        id: user.id,
        email: user.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = validate_email(&payload.email)?;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            ApiError::NotFound("user not found".into())
        })?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal(e.to_string())
    })?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e.to_string())
    })?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        email: user.email,
        access_token,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<StatusCode, ApiError> {
    // Updates re-run the creation rules; the payload replaces every field it
    // carries.
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e.to_string())
    })?;

    let rows = User::update(&state.db, id, &email, &hash).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("user not found".into()));
    }

    info!(user_id = id, "account updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let rows = User::delete(&state.db, id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("user not found".into()));
    }

    info!(user_id = id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_serialization() {
        let response = LoginResponse {
            email: "test@example.com".into(),
            access_token: "abc.def.ghi".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("access_token"));
    }
}
