use serde::{Deserialize, Serialize};

pub mod movie;
pub mod rating;
pub mod recommendation;
pub mod user;

pub use movie::{
    join_genres, normalize_genres, parse_genres, Movie, MovieId, MovieListQuery, MoviePage,
    NewMovie, SortField, SortOrder, MAX_PER_PAGE,
};
pub use rating::{is_valid_rating, NewRating, Rating, MAX_RATING, MIN_RATING};
pub use recommendation::{Recommendation, ScoredRecommendation};
pub use user::{NewFavorite, NewUser, User, UserId};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged list response from TMDB (`/search/movie`, `/movie/popular`, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// Raw movie entry returned by TMDB list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// Response from TMDB `/genre/movie/list`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<Genre>,
}

/// A TMDB genre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Movie metadata from the external provider, in catalog shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataMovie {
    pub tmdb_id: i64,
    pub title: String,
    pub overview: Option<String>,
    /// Comma-joined TMDB genre ids, the form the catalog stores genres in
    pub genres: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
}

impl From<TmdbMovie> for MetadataMovie {
    fn from(movie: TmdbMovie) -> Self {
        let genres = movie
            .genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        // TMDB sends "" for unknown release dates
        let release_date = movie.release_date.filter(|date| !date.is_empty());

        MetadataMovie {
            tmdb_id: movie.id,
            title: movie.title,
            overview: movie.overview,
            genres,
            release_date,
            poster_path: movie.poster_path,
            vote_average: movie.vote_average,
            popularity: movie.popularity,
        }
    }
}

/// A page of external search or listing results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub movies: Vec<MetadataMovie>,
}

impl From<TmdbPage> for MetadataPage {
    fn from(page: TmdbPage) -> Self {
        MetadataPage {
            page: page.page,
            total_pages: page.total_pages,
            total_results: page.total_results,
            movies: page.results.into_iter().map(MetadataMovie::from).collect(),
        }
    }
}
