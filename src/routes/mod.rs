use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::Store,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{catalog::CatalogService, providers::MetadataProvider, recommendations::Recommender},
};

pub mod metadata;
pub mod movies;
pub mod users;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub recommender: Recommender,
    /// Absent when no TMDB key is configured
    pub metadata: Option<Arc<dyn MetadataProvider>>,
}

impl AppState {
    /// Wires the services onto a single store backend
    pub fn from_store<S: Store + 'static>(
        store: Arc<S>,
        metadata: Option<Arc<dyn MetadataProvider>>,
    ) -> Self {
        Self {
            catalog: CatalogService::new(store.clone(), store.clone()),
            recommender: Recommender::new(store.clone(), store),
            metadata,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(movies::list).post(movies::create))
        .route("/movies/:id", get(movies::show))
        .route("/movies/:id/similar", get(movies::similar))
        .route("/genres", get(movies::genres))
        .route("/users", axum::routing::post(users::create))
        .route("/users/:id", get(users::show))
        .route("/users/:id/recommendations", get(users::recommendations))
        .route("/users/:id/ratings", get(users::ratings).post(users::rate))
        .route(
            "/users/:id/favorites",
            get(users::favorites).post(users::add_favorite),
        )
        .route("/metadata/search", get(metadata::search))
        .route("/metadata/popular", get(metadata::popular))
        .route("/metadata/top-rated", get(metadata::top_rated))
        .route("/metadata/genres", get(metadata::genres))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
