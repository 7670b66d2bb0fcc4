use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Catalog identifier of a movie
pub type MovieId = i64;

/// Separator used when genre tags are stored as a single column
pub const GENRE_DELIMITER: char = ',';

/// Represents a movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Catalog identifier
    pub id: MovieId,
    /// TMDB identifier, when the movie was imported from TMDB
    pub tmdb_id: Option<i64>,
    pub title: String,
    pub overview: Option<String>,
    /// Genre tags in stored order, duplicates preserved
    pub genres: Vec<String>,
    pub release_date: Option<NaiveDate>,
    pub poster_path: Option<String>,
    /// Average vote score on a 0-10 scale
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Request body for adding a movie to the catalog
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// Splits a stored genre column into its tags.
///
/// Tags keep their exact spelling; only empty segments are dropped, so
/// `"Action, Drama"` yields `"Action"` and `" Drama"`.
pub fn parse_genres(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(GENRE_DELIMITER)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Joins genre tags back into their stored form, `None` when there are no tags
pub fn join_genres(genres: &[String]) -> Option<String> {
    if genres.is_empty() {
        None
    } else {
        Some(genres.join(&GENRE_DELIMITER.to_string()))
    }
}

/// Splits any delimiter-bearing tags and drops empty ones.
///
/// The result is exactly what a `join_genres` / `parse_genres` round trip
/// through the stored column would produce.
pub fn normalize_genres(genres: &[String]) -> Vec<String> {
    genres
        .iter()
        .flat_map(|tag| parse_genres(Some(tag)))
        .collect()
}

/// Column a catalog listing can be ordered by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Title,
    Popularity,
    VoteAverage,
    ReleaseDate,
}

impl SortField {
    /// Column name in the `movies` table
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Popularity => "popularity",
            SortField::VoteAverage => "vote_average",
            SortField::ReleaseDate => "release_date",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Query parameters for listing the catalog
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MovieListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for MovieListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sort_by: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl MovieListQuery {
    /// Number of rows to skip for the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One page of the catalog
#[derive(Debug, Clone, Serialize)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}
