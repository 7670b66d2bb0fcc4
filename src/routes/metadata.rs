use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Genre, MetadataPage},
    routes::AppState,
    services::providers::MetadataProvider,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "first_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

fn provider(state: &AppState) -> AppResult<&Arc<dyn MetadataProvider>> {
    state.metadata.as_ref().ok_or_else(|| {
        AppError::Unavailable("Metadata search is not configured (TMDB_API_KEY)".to_string())
    })
}

/// Search the external movie database by title
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<MetadataPage>> {
    let provider = provider(&state)?;
    tracing::debug!(provider = provider.name(), query = %params.q, "Metadata search");
    Ok(Json(provider.search_movies(&params.q, params.page).await?))
}

pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<MetadataPage>> {
    Ok(Json(provider(&state)?.popular_movies(params.page).await?))
}

pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<MetadataPage>> {
    Ok(Json(provider(&state)?.top_rated_movies(params.page).await?))
}

pub async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(provider(&state)?.genres().await?))
}
