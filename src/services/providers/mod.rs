/// External movie metadata providers
///
/// The catalog itself is local; providers are only used to search and browse
/// a third-party database (TMDB) from which movies can be added.
use crate::{
    error::AppResult,
    models::{Genre, MetadataPage},
};

pub mod tmdb;

#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search movies by title
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MetadataPage>;

    async fn popular_movies(&self, page: u32) -> AppResult<MetadataPage>;

    async fn top_rated_movies(&self, page: u32) -> AppResult<MetadataPage>;

    /// The provider's genre list
    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
