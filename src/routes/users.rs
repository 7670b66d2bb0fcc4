use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Movie, NewFavorite, NewRating, NewUser, Rating, Recommendation, User, UserId},
    routes::AppState,
};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(user): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.catalog.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> AppResult<Json<User>> {
    Ok(Json(state.catalog.get_user(id).await?))
}

/// Collaborative recommendations for a user
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::info!(request_id = %request_id, user_id = id, "Collaborative recommendation request");

    let recommendations = state.recommender.recommend_collaborative(id).await?;
    Ok(Json(recommendations))
}

pub async fn ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.catalog.user_ratings(id).await?))
}

/// Creates or replaces the user's rating of a movie
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Json(rating): Json<NewRating>,
) -> AppResult<Json<Rating>> {
    Ok(Json(state.catalog.rate_movie(id, rating).await?))
}

pub async fn favorites(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.favorites(id).await?))
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Json(favorite): Json<NewFavorite>,
) -> AppResult<StatusCode> {
    state.catalog.add_favorite(id, favorite.movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
