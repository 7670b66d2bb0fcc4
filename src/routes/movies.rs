use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Movie, MovieId, MovieListQuery, MoviePage, NewMovie, ScoredRecommendation},
    routes::AppState,
};

/// Paginated catalog listing
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovieListQuery>,
) -> AppResult<Json<MoviePage>> {
    Ok(Json(state.catalog.list_movies(query).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = state.catalog.add_movie(movie).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.catalog.get_movie(id).await?))
}

/// Movies with the most similar genres
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<Vec<ScoredRecommendation>>> {
    tracing::info!(request_id = %request_id, movie_id = id, "Content recommendation request");

    let recommendations = state.recommender.recommend_content(id).await?;
    Ok(Json(recommendations))
}

/// Distinct genres in the catalog
pub async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_genres().await?))
}
