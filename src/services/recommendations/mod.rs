//! Collaborative and content-based movie recommendations.
//!
//! Every request reads a fresh snapshot from the stores and rebuilds its
//! matrices from scratch; nothing is cached between requests. Both
//! similarity computations are quadratic in users or movies.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::db::{MovieStore, RatingStore, StoreError};
use crate::models::{MovieId, Recommendation, ScoredRecommendation, UserId};

pub mod collaborative;
pub mod content;
pub mod genres;
pub mod interaction;
pub mod similarity;

/// Number of nearest users consulted for collaborative recommendations
pub const NEIGHBOR_COUNT: usize = 5;
/// Lowest neighbor rating that makes a movie a candidate
pub const MIN_NEIGHBOR_RATING: f64 = 4.0;
/// Maximum length of any recommendation list
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Error types for the recommendation engine
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("User {0} has no rating history")]
    UserNotFound(UserId),

    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Entry point for both recommendation strategies
#[derive(Clone)]
pub struct Recommender {
    ratings: Arc<dyn RatingStore>,
    movies: Arc<dyn MovieStore>,
}

impl Recommender {
    pub fn new(ratings: Arc<dyn RatingStore>, movies: Arc<dyn MovieStore>) -> Self {
        Self { ratings, movies }
    }

    /// Up to ten movies liked by the users whose ratings look most like `user_id`'s.
    ///
    /// Fails with `UserNotFound` if the user has never rated anything.
    #[tracing::instrument(skip(self))]
    pub async fn recommend_collaborative(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let start = Instant::now();

        let ratings = self.ratings.list_all_ratings().await?;
        let movies = self.movies.list_all_movies().await?;
        let recommendations = collaborative::recommend_for_user(user_id, &ratings, &movies)?;

        tracing::info!(
            ratings = ratings.len(),
            count = recommendations.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Collaborative recommendations computed"
        );

        Ok(recommendations)
    }

    /// Up to ten movies whose genres are closest to `movie_id`'s, with scores.
    ///
    /// Fails with `MovieNotFound` if the movie is not in the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn recommend_content(
        &self,
        movie_id: MovieId,
    ) -> Result<Vec<ScoredRecommendation>, RecommendError> {
        let start = Instant::now();

        if self.movies.get_movie(movie_id).await?.is_none() {
            return Err(RecommendError::MovieNotFound(movie_id));
        }

        let movies = self.movies.list_all_movies().await?;
        let recommendations = content::recommend_similar(movie_id, &movies)?;

        tracing::info!(
            movies = movies.len(),
            count = recommendations.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Content recommendations computed"
        );

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{MockMovieStore, MockRatingStore};
    use crate::models::{Movie, Rating};
    use chrono::Utc;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn movie(id: MovieId, genres: &[&str]) -> Movie {
        Movie {
            id,
            tmdb_id: None,
            title: format!("Movie {}", id),
            overview: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            release_date: None,
            poster_path: None,
            vote_average: None,
            popularity: None,
            created_at: Utc::now(),
        }
    }

    fn rating(user_id: UserId, movie_id: MovieId, score: f64) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating: score,
            review: None,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie(1, &["Action", "Drama"]),
            movie(2, &["Action"]),
            movie(3, &["Comedy"]),
        ]
    }

    fn recommender(ratings: MockRatingStore, movies: MockMovieStore) -> Recommender {
        Recommender::new(Arc::new(ratings), Arc::new(movies))
    }

    #[tokio::test]
    async fn test_collaborative_reads_snapshot() {
        let mut ratings = MockRatingStore::new();
        ratings.expect_list_all_ratings().times(1).returning(|| {
            Ok(vec![
                rating(1, 1, 5.0),
                rating(1, 2, 1.0),
                rating(2, 1, 5.0),
                rating(2, 3, 5.0),
            ])
        });
        let mut movies = MockMovieStore::new();
        movies
            .expect_list_all_movies()
            .times(1)
            .returning(|| Ok(catalog()));

        let result = assert_ok!(recommender(ratings, movies).recommend_collaborative(1).await);
        let ids: Vec<MovieId> = result.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_collaborative_unknown_user() {
        let mut ratings = MockRatingStore::new();
        ratings
            .expect_list_all_ratings()
            .returning(|| Ok(vec![rating(1, 1, 5.0)]));
        let mut movies = MockMovieStore::new();
        movies.expect_list_all_movies().returning(|| Ok(catalog()));

        let err = assert_err!(recommender(ratings, movies).recommend_collaborative(2).await);
        assert!(matches!(err, RecommendError::UserNotFound(2)));
    }

    #[tokio::test]
    async fn test_collaborative_store_failure_propagates() {
        let mut ratings = MockRatingStore::new();
        ratings
            .expect_list_all_ratings()
            .returning(|| Err(StoreError::Database(sqlx::Error::PoolTimedOut)));
        let mut movies = MockMovieStore::new();
        movies.expect_list_all_movies().never();

        let err = assert_err!(recommender(ratings, movies).recommend_collaborative(1).await);
        assert!(matches!(err, RecommendError::Store(_)));
    }

    #[tokio::test]
    async fn test_content_ranks_by_genre() {
        let mut movies = MockMovieStore::new();
        movies
            .expect_get_movie()
            .with(eq(1))
            .returning(|_| Ok(Some(movie(1, &["Action", "Drama"]))));
        movies.expect_list_all_movies().returning(|| Ok(catalog()));

        let result = assert_ok!(
            recommender(MockRatingStore::new(), movies)
                .recommend_content(1)
                .await
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].movie.id, 2);
        assert!(result[0].similarity_score > 0.0);
        assert_eq!(result[1].movie.id, 3);
        assert_eq!(result[1].similarity_score, 0.0);
    }

    #[tokio::test]
    async fn test_content_missing_movie_skips_catalog_scan() {
        let mut movies = MockMovieStore::new();
        movies.expect_get_movie().with(eq(42)).returning(|_| Ok(None));
        movies.expect_list_all_movies().never();

        let err = assert_err!(
            recommender(MockRatingStore::new(), movies)
                .recommend_content(42)
                .await
        );
        assert!(matches!(err, RecommendError::MovieNotFound(42)));
    }
}
