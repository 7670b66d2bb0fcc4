use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{CatalogStore, MovieStore},
    error::{AppError, AppResult},
    models::{
        is_valid_rating, normalize_genres, Movie, MovieId, MovieListQuery, MoviePage, NewMovie,
        NewRating, NewUser, Rating, User, UserId, MAX_PER_PAGE, MAX_RATING, MIN_RATING,
    },
};

/// Catalog reads and writes with request validation
#[derive(Clone)]
pub struct CatalogService {
    movies: Arc<dyn MovieStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(movies: Arc<dyn MovieStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { movies, catalog }
    }

    pub async fn add_movie(&self, mut movie: NewMovie) -> AppResult<Movie> {
        movie.title = movie.title.trim().to_string();
        if movie.title.is_empty() {
            return Err(AppError::InvalidInput("Movie title cannot be empty".to_string()));
        }
        // Same tags a round trip through the stored genre column yields
        movie.genres = normalize_genres(&movie.genres);
        if let Some(vote) = movie.vote_average {
            if !(0.0..=10.0).contains(&vote) {
                return Err(AppError::InvalidInput(
                    "vote_average must be between 0 and 10".to_string(),
                ));
            }
        }

        let movie = self.catalog.insert_movie(movie).await?;
        tracing::info!(movie_id = movie.id, title = %movie.title, "Movie added");
        Ok(movie)
    }

    pub async fn get_movie(&self, id: MovieId) -> AppResult<Movie> {
        self.movies
            .get_movie(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
    }

    pub async fn list_movies(&self, query: MovieListQuery) -> AppResult<MoviePage> {
        if query.page == 0 {
            return Err(AppError::InvalidInput("page starts at 1".to_string()));
        }
        if query.per_page == 0 || query.per_page > MAX_PER_PAGE {
            return Err(AppError::InvalidInput(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        let movies = self.catalog.list_movies(&query).await?;
        let total = self.movies.count_movies().await?;

        Ok(MoviePage {
            movies,
            page: query.page,
            per_page: query.per_page,
            total,
        })
    }

    /// Distinct genre tags across the catalog, in first-seen order
    pub async fn list_genres(&self) -> AppResult<Vec<String>> {
        let movies = self.movies.list_all_movies().await?;
        let mut seen = HashSet::new();

        Ok(movies
            .into_iter()
            .flat_map(|m| m.genres)
            .filter(|genre| seen.insert(genre.clone()))
            .collect())
    }

    pub async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let username = user.username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("Username cannot be empty".to_string()));
        }

        let user = self.catalog.insert_user(username).await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<User> {
        self.catalog
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Records a rating, replacing any earlier rating of the same movie by the same user
    pub async fn rate_movie(&self, user_id: UserId, rating: NewRating) -> AppResult<Rating> {
        if !is_valid_rating(rating.rating) {
            return Err(AppError::InvalidInput(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        self.get_user(user_id).await?;
        self.get_movie(rating.movie_id).await?;

        let rating = self.catalog.upsert_rating(user_id, rating).await?;
        tracing::info!(
            user_id,
            movie_id = rating.movie_id,
            rating = rating.rating,
            "Rating saved"
        );
        Ok(rating)
    }

    pub async fn user_ratings(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        self.get_user(user_id).await?;
        Ok(self.catalog.list_user_ratings(user_id).await?)
    }

    pub async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> AppResult<()> {
        self.get_user(user_id).await?;
        self.get_movie(movie_id).await?;
        Ok(self.catalog.add_favorite(user_id, movie_id).await?)
    }

    pub async fn favorites(&self, user_id: UserId) -> AppResult<Vec<Movie>> {
        self.get_user(user_id).await?;
        Ok(self.catalog.list_favorites(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{MockCatalogStore, MockMovieStore};
    use crate::db::StoreError;
    use chrono::Utc;
    use mockall::predicate::eq;

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

    fn user(id: UserId) -> User {
        User {
            id,
            username: format!("user{}", id),
            created_at: Utc::now(),
        }
    }

    fn service(movies: MockMovieStore, catalog: MockCatalogStore) -> CatalogService {
        CatalogService::new(Arc::new(movies), Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_rate_movie_rejects_out_of_range() {
        let mut catalog = MockCatalogStore::new();
        catalog.expect_upsert_rating().never();

        let result = service(MockMovieStore::new(), catalog)
            .rate_movie(
                1,
                NewRating {
                    movie_id: 1,
                    rating: 0.0,
                    review: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_rate_movie_unknown_movie() {
        let mut movies = MockMovieStore::new();
        movies.expect_get_movie().with(eq(9)).returning(|_| Ok(None));
        let mut catalog = MockCatalogStore::new();
        catalog.expect_get_user().returning(|id| Ok(Some(user(id))));
        catalog.expect_upsert_rating().never();

        let result = service(movies, catalog)
            .rate_movie(
                1,
                NewRating {
                    movie_id: 9,
                    rating: 4.0,
                    review: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rate_movie_upserts() {
        let mut movies = MockMovieStore::new();
        movies.expect_get_movie().returning(|id| Ok(Some(movie(id, &[]))));
        let mut catalog = MockCatalogStore::new();
        catalog.expect_get_user().returning(|id| Ok(Some(user(id))));
        catalog
            .expect_upsert_rating()
            .times(1)
            .returning(|user_id, rating| {
                Ok(Rating {
                    user_id,
                    movie_id: rating.movie_id,
                    rating: rating.rating,
                    review: rating.review,
                    created_at: Utc::now(),
                })
            });

        let rating = service(movies, catalog)
            .rate_movie(
                3,
                NewRating {
                    movie_id: 7,
                    rating: 4.5,
                    review: Some("Tense".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(rating.user_id, 3);
        assert_eq!(rating.movie_id, 7);
        assert_eq!(rating.rating, 4.5);
    }

    #[tokio::test]
    async fn test_list_movies_validates_paging() {
        let svc = service(MockMovieStore::new(), MockCatalogStore::new());

        let zero_page = MovieListQuery {
            page: 0,
            ..Default::default()
        };
        assert!(matches!(
            svc.list_movies(zero_page).await,
            Err(AppError::InvalidInput(_))
        ));

        let huge_page = MovieListQuery {
            per_page: 500,
            ..Default::default()
        };
        assert!(matches!(
            svc.list_movies(huge_page).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_list_movies_reports_total() {
        let mut movies = MockMovieStore::new();
        movies.expect_count_movies().returning(|| Ok(42));
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_list_movies()
            .returning(|_| Ok(vec![movie(1, &[]), movie(2, &[])]));

        let page = service(movies, catalog)
            .list_movies(MovieListQuery::default())
            .await
            .unwrap();

        assert_eq!(page.movies.len(), 2);
        assert_eq!(page.total, 42);
        assert_eq!(page.page, 1);
    }

    #[tokio::test]
    async fn test_list_genres_first_seen_order() {
        let mut movies = MockMovieStore::new();
        movies.expect_list_all_movies().returning(|| {
            Ok(vec![
                movie(1, &["Drama", "Action"]),
                movie(2, &["Action", "Comedy"]),
                movie(3, &[]),
            ])
        });

        let genres = service(movies, MockCatalogStore::new())
            .list_genres()
            .await
            .unwrap();

        assert_eq!(genres, vec!["Drama", "Action", "Comedy"]);
    }

    #[tokio::test]
    async fn test_create_user_trims_and_maps_conflict() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_insert_user()
            .with(eq("alice"))
            .returning(|_| Err(StoreError::Conflict("username already exists".to_string())));

        let result = service(MockMovieStore::new(), catalog)
            .create_user(NewUser {
                username: "  alice ".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn test_add_movie_splits_genre_tags() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_insert_movie()
            .withf(|m| m.genres == vec!["Action", "Drama", "Comedy"])
            .times(1)
            .returning(|m| {
                let mut stored = movie(1, &[]);
                stored.title = m.title;
                stored.genres = m.genres;
                Ok(stored)
            });

        let movie = service(MockMovieStore::new(), catalog)
            .add_movie(NewMovie {
                title: "Heat".to_string(),
                genres: vec!["Action,Drama".to_string(), String::new(), "Comedy".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(movie.genres, vec!["Action", "Drama", "Comedy"]);
    }

    #[tokio::test]
    async fn test_add_movie_requires_title() {
        let mut catalog = MockCatalogStore::new();
        catalog.expect_insert_movie().never();

        let result = service(MockMovieStore::new(), catalog)
            .add_movie(NewMovie {
                title: "   ".to_string(),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
