//! Movie x genre one-hot features for content-based filtering.

use std::collections::HashMap;

use ndarray::Array2;

use crate::models::{Movie, MovieId};

/// One-hot genre features, one row per movie in catalog order.
///
/// Columns are the distinct genre tags in first-seen order. Tags compare by
/// exact string, so `"Drama"` and `" Drama"` are different genres.
#[derive(Debug, Clone)]
pub struct GenreFeatures {
    pub matrix: Array2<f64>,
    /// Row index to movie id
    pub movies: Vec<MovieId>,
    /// Column index to genre tag
    pub genres: Vec<String>,
}

impl GenreFeatures {
    pub fn build(movies: &[Movie]) -> Self {
        let mut genres: Vec<String> = Vec::new();
        let mut columns: HashMap<&str, usize> = HashMap::new();
        for movie in movies {
            for tag in &movie.genres {
                columns.entry(tag.as_str()).or_insert_with(|| {
                    genres.push(tag.clone());
                    genres.len() - 1
                });
            }
        }

        let mut matrix = Array2::<f64>::zeros((movies.len(), genres.len()));
        for (row, movie) in movies.iter().enumerate() {
            for tag in &movie.genres {
                matrix[[row, columns[tag.as_str()]]] = 1.0;
            }
        }

        Self {
            matrix,
            movies: movies.iter().map(|m| m.id).collect(),
            genres,
        }
    }

    /// Row of `movie_id`, if it is part of the catalog
    pub fn movie_row(&self, movie_id: MovieId) -> Option<usize> {
        self.movies.iter().position(|id| *id == movie_id)
    }
}
