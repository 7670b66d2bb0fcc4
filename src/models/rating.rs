use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MovieId, UserId};

/// Lowest accepted star rating
pub const MIN_RATING: f64 = 1.0;
/// Highest accepted star rating
pub const MAX_RATING: f64 = 5.0;

/// A user's rating of a movie, unique per (user, movie)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Star score within `MIN_RATING..=MAX_RATING`
    pub rating: f64,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for rating a movie
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NewRating {
    pub movie_id: MovieId,
    pub rating: f64,
    #[serde(default)]
    pub review: Option<String>,
}

/// Returns true if `score` is a valid star rating
pub fn is_valid_rating(score: f64) -> bool {
    score.is_finite() && (MIN_RATING..=MAX_RATING).contains(&score)
}
