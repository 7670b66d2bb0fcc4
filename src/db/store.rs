use async_trait::async_trait;

use crate::models::{
    Movie, MovieId, MovieListQuery, NewMovie, NewRating, Rating, User, UserId,
};

/// Errors raised by a catalog store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Missing reference: {0}")]
    MissingReference(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to every rating in the store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Full scan of all ratings, oldest first
    async fn list_all_ratings(&self) -> StoreResult<Vec<Rating>>;
}

/// Read access to the movie catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Full scan of the catalog, ordered by id
    async fn list_all_movies(&self) -> StoreResult<Vec<Movie>>;

    async fn get_movie(&self, id: MovieId) -> StoreResult<Option<Movie>>;

    async fn count_movies(&self) -> StoreResult<i64>;
}

/// Write side of the catalog plus the per-user lookups the API needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_movie(&self, movie: NewMovie) -> StoreResult<Movie>;

    /// One page of the catalog in the requested order
    async fn list_movies(&self, query: &MovieListQuery) -> StoreResult<Vec<Movie>>;

    /// Fails with `StoreError::Conflict` when the username is taken
    async fn insert_user(&self, username: &str) -> StoreResult<User>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Inserts a rating or overwrites the score and review of an existing one
    async fn upsert_rating(&self, user_id: UserId, rating: NewRating) -> StoreResult<Rating>;

    async fn list_user_ratings(&self, user_id: UserId) -> StoreResult<Vec<Rating>>;

    /// Marks a movie as favorite; adding it twice is a no-op
    async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> StoreResult<()>;

    async fn list_favorites(&self, user_id: UserId) -> StoreResult<Vec<Movie>>;
}

/// A backend implementing every store trait
pub trait Store: RatingStore + MovieStore + CatalogStore {}

impl<T: RatingStore + MovieStore + CatalogStore> Store for T {}
