use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::CurrentUser,
    error::ApiError,
    movies::dto::{CreatedMovie, MovieItem, MoviePayload, OwnMoviesQuery, Pagination},
    movies::repo_types::Movie,
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/list_all_movies", get(list_all_movies))
}

pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/movie", post(create_movie))
        .route("/movie/:id", put(update_movie).delete(delete_movie))
        .route("/list_user_movies", get(list_user_movies))
}

#[instrument(skip(state, user, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<MoviePayload>,
) -> Result<(StatusCode, Json<CreatedMovie>), ApiError> {
    let movie = Movie::create(&state.db, user.id, &payload).await?;
    info!(movie_id = movie.id, user_id = user.id, "review created");
    Ok((StatusCode::CREATED, Json(CreatedMovie { title: movie.title })))
}

#[instrument(skip(state))]
pub async fn list_all_movies(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MovieItem>>, ApiError> {
    let movies = Movie::list_public(&state.db, p.limit, p.offset).await?;
    Ok(Json(movies.into_iter().map(MovieItem::from).collect()))
}

#[instrument(skip(state, user))]
pub async fn list_user_movies(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<OwnMoviesQuery>,
) -> Result<Json<Vec<MovieItem>>, ApiError> {
    let movies =
        Movie::list_by_owner(&state.db, user.id, q.is_private, q.limit, q.offset).await?;
    Ok(Json(movies.into_iter().map(MovieItem::from).collect()))
}

#[instrument(skip(state, user, payload))]
pub async fn update_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<MoviePayload>,
) -> Result<StatusCode, ApiError> {
    let rows = Movie::update_owned(&state.db, id, user.id, &payload).await?;
    if rows == 0 {
        // Missing and foreign records answer identically.
        warn!(movie_id = id, user_id = user.id, "update rejected");
        return Err(ApiError::Unauthorized);
    }

    info!(movie_id = id, user_id = user.id, "review updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user))]
pub async fn delete_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let rows = Movie::delete_owned(&state.db, id, user.id).await?;
    if rows == 0 {
        warn!(movie_id = id, user_id = user.id, "delete rejected");
        return Err(ApiError::Unauthorized);
    }

    info!(movie_id = id, user_id = user.id, "review deleted");
    Ok(StatusCode::NO_CONTENT)
}
