use serde::{Deserialize, Serialize};

use super::{Movie, MovieId};

/// A recommended movie as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

impl From<&Movie> for Recommendation {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: movie.vote_average,
        }
    }
}

/// A content-based recommendation annotated with its genre similarity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecommendation {
    #[serde(flatten)]
    pub movie: Recommendation,
    pub similarity_score: f64,
}
