use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    Movie, MovieId, MovieListQuery, NewMovie, NewRating, Rating, SortField, SortOrder, User,
    UserId,
};

use super::store::{CatalogStore, MovieStore, RatingStore, StoreError, StoreResult};

/// Process-local store used with `STORAGE_BACKEND=memory` and in tests.
///
/// Ratings keep insertion order, which plays the role of the creation
/// order Postgres sorts by.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    movies: Vec<Movie>,
    users: Vec<User>,
    ratings: Vec<Rating>,
    favorites: Vec<(UserId, MovieId)>,
    next_movie_id: MovieId,
    next_user_id: UserId,
}

impl MemoryInner {
    fn has_movie(&self, id: MovieId) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }

    fn has_user(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Compares optional values with missing ones last in either direction
fn nulls_last<T: PartialOrd>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.partial_cmp(&b).unwrap_or(Ordering::Equal), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_movies(a: &Movie, b: &Movie, query: &MovieListQuery) -> Ordering {
    let primary = match query.sort_by {
        SortField::Id => directed(a.id.cmp(&b.id), query.order),
        SortField::Title => directed(a.title.cmp(&b.title), query.order),
        SortField::Popularity => nulls_last(a.popularity, b.popularity, query.order),
        SortField::VoteAverage => nulls_last(a.vote_average, b.vote_average, query.order),
        SortField::ReleaseDate => nulls_last(a.release_date, b.release_date, query.order),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn list_all_ratings(&self) -> StoreResult<Vec<Rating>> {
        Ok(self.inner.read().await.ratings.clone())
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn list_all_movies(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.inner.read().await.movies.clone())
    }

    async fn get_movie(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn count_movies(&self) -> StoreResult<i64> {
        Ok(self.inner.read().await.movies.len() as i64)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let mut inner = self.inner.write().await;

        if let Some(tmdb_id) = movie.tmdb_id {
            if inner.movies.iter().any(|m| m.tmdb_id == Some(tmdb_id)) {
                return Err(StoreError::Conflict("movie already exists".to_string()));
            }
        }

        inner.next_movie_id += 1;
        let movie = Movie {
            id: inner.next_movie_id,
            tmdb_id: movie.tmdb_id,
            title: movie.title,
            overview: movie.overview,
            genres: movie.genres,
            release_date: movie.release_date,
            poster_path: movie.poster_path,
            vote_average: movie.vote_average,
            popularity: movie.popularity,
            created_at: Utc::now(),
        };
        inner.movies.push(movie.clone());

        Ok(movie)
    }

    async fn list_movies(&self, query: &MovieListQuery) -> StoreResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies = inner.movies.clone();
        movies.sort_by(|a, b| compare_movies(a, b, query));

        Ok(movies
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect())
    }

    async fn insert_user(&self, username: &str) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict("username already exists".to_string()));
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_rating(&self, user_id: UserId, rating: NewRating) -> StoreResult<Rating> {
        let mut inner = self.inner.write().await;

        if !inner.has_user(user_id) || !inner.has_movie(rating.movie_id) {
            return Err(StoreError::MissingReference(
                "rating references a missing row".to_string(),
            ));
        }

        if let Some(existing) = inner
            .ratings
            .iter_mut()
            .find(|r| r.user_id == user_id && r.movie_id == rating.movie_id)
        {
            existing.rating = rating.rating;
            existing.review = rating.review;
            return Ok(existing.clone());
        }

        let rating = Rating {
            user_id,
            movie_id: rating.movie_id,
            rating: rating.rating,
            review: rating.review,
            created_at: Utc::now(),
        };
        inner.ratings.push(rating.clone());

        Ok(rating)
    }

    async fn list_user_ratings(&self, user_id: UserId) -> StoreResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;

        if !inner.has_user(user_id) || !inner.has_movie(movie_id) {
            return Err(StoreError::MissingReference(
                "favorite references a missing row".to_string(),
            ));
        }

        if !inner.favorites.contains(&(user_id, movie_id)) {
            inner.favorites.push((user_id, movie_id));
        }

        Ok(())
    }

    async fn list_favorites(&self, user_id: UserId) -> StoreResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies: Vec<Movie> = inner
            .movies
            .iter()
            .filter(|m| inner.favorites.contains(&(user_id, m.id)))
            .cloned()
            .collect();
        movies.sort_by_key(|m| m.id);

        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_movie(title: &str, popularity: Option<f64>) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            popularity,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_rating_overwrites_existing_pair() {
        let store = MemoryStore::new();
        let user = store.insert_user("alice").await.unwrap();
        let movie = store.insert_movie(new_movie("Alien", None)).await.unwrap();

        let first = NewRating {
            movie_id: movie.id,
            rating: 2.0,
            review: None,
        };
        let second = NewRating {
            movie_id: movie.id,
            rating: 5.0,
            review: Some("Better the second time".to_string()),
        };
        store.upsert_rating(user.id, first).await.unwrap();
        store.upsert_rating(user.id, second).await.unwrap();

        let ratings = store.list_all_ratings().await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 5.0);
        assert_eq!(ratings[0].review.as_deref(), Some("Better the second time"));
    }

    #[tokio::test]
    async fn test_upsert_rating_missing_movie() {
        let store = MemoryStore::new();
        let user = store.insert_user("alice").await.unwrap();

        let result = store
            .upsert_rating(
                user.id,
                NewRating {
                    movie_id: 42,
                    rating: 3.0,
                    review: None,
                },
            )
            .await;

        assert!(matches!(result, Err(StoreError::MissingReference(_))));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = MemoryStore::new();
        store.insert_user("alice").await.unwrap();

        let result = store.insert_user("alice").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_movies_sorts_nulls_last_and_pages() {
        let store = MemoryStore::new();
        store.insert_movie(new_movie("A", Some(1.0))).await.unwrap();
        store.insert_movie(new_movie("B", None)).await.unwrap();
        store.insert_movie(new_movie("C", Some(9.0))).await.unwrap();

        let query = MovieListQuery {
            page: 1,
            per_page: 2,
            sort_by: SortField::Popularity,
            order: SortOrder::Desc,
        };
        let titles: Vec<String> = store
            .list_movies(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["C", "A"]);

        let second_page = MovieListQuery { page: 2, ..query };
        let movies = store.list_movies(&second_page).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "B");
    }

    #[tokio::test]
    async fn test_favorites_are_idempotent() {
        let store = MemoryStore::new();
        let user = store.insert_user("bob").await.unwrap();
        let movie = store.insert_movie(new_movie("Heat", None)).await.unwrap();

        store.add_favorite(user.id, movie.id).await.unwrap();
        store.add_favorite(user.id, movie.id).await.unwrap();

        let favorites = store.list_favorites(user.id).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, movie.id);
    }
}
