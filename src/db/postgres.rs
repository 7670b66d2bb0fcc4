use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::models::{
    join_genres, parse_genres, Movie, MovieId, MovieListQuery, NewMovie, NewRating, Rating, User,
    UserId,
};

use super::store::{CatalogStore, MovieStore, RatingStore, StoreError, StoreResult};

const MOVIE_COLUMNS: &str = "id, tmdb_id, title, overview, genres, release_date, poster_path, \
                             vote_average, popularity, created_at";

const RATING_COLUMNS: &str = "user_id, movie_id, rating, review, created_at";

/// Creates a PostgreSQL connection pool and applies pending migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(max_connections, "Database pool ready, migrations applied");

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i64,
    tmdb_id: Option<i64>,
    title: String,
    overview: Option<String>,
    genres: Option<String>,
    release_date: Option<NaiveDate>,
    poster_path: Option<String>,
    vote_average: Option<f64>,
    popularity: Option<f64>,
    created_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            tmdb_id: row.tmdb_id,
            title: row.title,
            overview: row.overview,
            genres: parse_genres(row.genres.as_deref()),
            release_date: row.release_date,
            poster_path: row.poster_path,
            vote_average: row.vote_average,
            popularity: row.popularity,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    user_id: i64,
    movie_id: i64,
    rating: f64,
    review: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            review: row.review,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

/// Maps constraint violations onto store errors the API can report
fn classify(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{} already exists", what));
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference(format!("{} references a missing row", what));
        }
    }
    StoreError::Database(err)
}

/// Postgres-backed catalog store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn list_all_ratings(&self) -> StoreResult<Vec<Rating>> {
        let sql = format!("SELECT {} FROM ratings ORDER BY created_at, id", RATING_COLUMNS);
        let rows: Vec<RatingRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Rating::from).collect())
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn list_all_movies(&self) -> StoreResult<Vec<Movie>> {
        let sql = format!("SELECT {} FROM movies ORDER BY id", MOVIE_COLUMNS);
        let rows: Vec<MovieRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn get_movie(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let row: Option<MovieRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn count_movies(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let sql = format!(
            r#"
            INSERT INTO movies
                (tmdb_id, title, overview, genres, release_date, poster_path, vote_average, popularity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        );

        let row: MovieRow = sqlx::query_as(&sql)
            .bind(movie.tmdb_id)
            .bind(&movie.title)
            .bind(&movie.overview)
            .bind(join_genres(&movie.genres))
            .bind(movie.release_date)
            .bind(&movie.poster_path)
            .bind(movie.vote_average)
            .bind(movie.popularity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "movie"))?;

        Ok(row.into())
    }

    async fn list_movies(&self, query: &MovieListQuery) -> StoreResult<Vec<Movie>> {
        // Column and direction come from closed enums, never from raw input
        let sql = format!(
            "SELECT {} FROM movies ORDER BY {} {} NULLS LAST, id ASC LIMIT $1 OFFSET $2",
            MOVIE_COLUMNS,
            query.sort_by.column(),
            query.order.keyword(),
        );

        let rows: Vec<MovieRow> = sqlx::query_as(&sql)
            .bind(i64::from(query.per_page))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn insert_user(&self, username: &str) -> StoreResult<User> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username) VALUES ($1) RETURNING id, username, created_at",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "username"))?;

        Ok(row.into())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    async fn upsert_rating(&self, user_id: UserId, rating: NewRating) -> StoreResult<Rating> {
        let sql = format!(
            r#"
            INSERT INTO ratings (user_id, movie_id, rating, review)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, movie_id)
            DO UPDATE SET rating = EXCLUDED.rating, review = EXCLUDED.review
            RETURNING {}
            "#,
            RATING_COLUMNS
        );

        let row: RatingRow = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(rating.movie_id)
            .bind(rating.rating)
            .bind(&rating.review)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "rating"))?;

        Ok(row.into())
    }

    async fn list_user_ratings(&self, user_id: UserId) -> StoreResult<Vec<Rating>> {
        let sql = format!(
            "SELECT {} FROM ratings WHERE user_id = $1 ORDER BY created_at, id",
            RATING_COLUMNS
        );

        let rows: Vec<RatingRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Rating::from).collect())
    }

    async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO favorites (user_id, movie_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, "favorite"))?;

        Ok(())
    }

    async fn list_favorites(&self, user_id: UserId) -> StoreResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(
            r#"
            SELECT m.id, m.tmdb_id, m.title, m.overview, m.genres, m.release_date,
                   m.poster_path, m.vote_average, m.popularity, m.created_at
            FROM movies m
            JOIN favorites f ON f.movie_id = m.id
            WHERE f.user_id = $1
            ORDER BY m.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }
}
