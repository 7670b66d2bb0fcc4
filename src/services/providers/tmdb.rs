/// TMDB metadata provider
///
/// All lookups go through the Redis cache; TMDB is only contacted on a miss.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Genre, MetadataPage, TmdbGenreList, TmdbPage},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const LIST_CACHE_TTL: u64 = 21600; // 6 hours
const GENRE_CACHE_TTL: u64 = 604800; // 1 week

/// TMDB rejects page numbers above this
pub const MAX_TMDB_PAGE: u32 = 500;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn check_page(page: u32) -> AppResult<()> {
        if page == 0 || page > MAX_TMDB_PAGE {
            return Err(AppError::InvalidInput(format!(
                "page must be between 1 and {}",
                MAX_TMDB_PAGE
            )));
        }
        Ok(())
    }

    /// GETs `path` with the API key and decodes the JSON body
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path, status = %status, "TMDB request failed");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let decoded = response.json().await?;
        tracing::debug!(path, "TMDB request succeeded");
        Ok(decoded)
    }

    async fn fetch_page(&self, path: &str, params: &[(&str, String)]) -> AppResult<MetadataPage> {
        let page: TmdbPage = self.get(path, params).await?;
        Ok(page.into())
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MetadataPage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        Self::check_page(page)?;

        cached!(
            self.cache,
            CacheKey::MovieSearch {
                query: query.to_string(),
                page,
            },
            SEARCH_CACHE_TTL,
            async {
                let results = self
                    .fetch_page(
                        "/search/movie",
                        &[("query", query.to_string()), ("page", page.to_string())],
                    )
                    .await?;

                tracing::info!(
                    query = %query,
                    page,
                    count = results.movies.len(),
                    "TMDB search completed"
                );

                Ok::<_, AppError>(results)
            }
        )
    }

    async fn popular_movies(&self, page: u32) -> AppResult<MetadataPage> {
        Self::check_page(page)?;

        cached!(
            self.cache,
            CacheKey::Popular(page),
            LIST_CACHE_TTL,
            self.fetch_page("/movie/popular", &[("page", page.to_string())])
        )
    }

    async fn top_rated_movies(&self, page: u32) -> AppResult<MetadataPage> {
        Self::check_page(page)?;

        cached!(
            self.cache,
            CacheKey::TopRated(page),
            LIST_CACHE_TTL,
            self.fetch_page("/movie/top_rated", &[("page", page.to_string())])
        )
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        cached!(self.cache, CacheKey::Genres, GENRE_CACHE_TTL, async {
            let list: TmdbGenreList = self.get("/genre/movie/list", &[]).await?;
            Ok::<_, AppError>(list.genres)
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert!(TmdbProvider::check_page(1).is_ok());
        assert!(TmdbProvider::check_page(MAX_TMDB_PAGE).is_ok());
        assert!(matches!(
            TmdbProvider::check_page(0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            TmdbProvider::check_page(MAX_TMDB_PAGE + 1),
            Err(AppError::InvalidInput(_))
        ));
    }
}
