use std::sync::Arc;

use movie_stack::{
    config::{Config, StorageBackend},
    db::{create_pool, create_redis_client, Cache, CacheWriterHandle, MemoryStore, PgStore},
    routes::{create_router, AppState},
    services::providers::{tmdb::TmdbProvider, MetadataProvider},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_stack=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (metadata, cache_handle) = init_metadata(&config).await?;

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.database_max_connections).await?;
            AppState::from_store(Arc::new(PgStore::new(pool)), metadata)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            AppState::from_store(Arc::new(MemoryStore::new()), metadata)
        }
    };

    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

/// Sets up the TMDB provider and its Redis cache when a key is configured
async fn init_metadata(
    config: &Config,
) -> anyhow::Result<(Option<Arc<dyn MetadataProvider>>, Option<CacheWriterHandle>)> {
    let Some(api_key) = config.tmdb_api_key.clone() else {
        tracing::warn!("TMDB_API_KEY not set, metadata search disabled");
        return Ok((None, None));
    };

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, handle) = Cache::new(redis_client).await;
    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(
        cache,
        api_key,
        config.tmdb_api_url.clone(),
    ));

    tracing::info!(provider = provider.name(), "Metadata provider enabled");

    Ok((Some(provider), Some(handle)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
