//! User x movie rating matrix for collaborative filtering.

use std::collections::HashMap;

use ndarray::Array2;

use crate::models::{MovieId, Rating, UserId};

/// Ratings laid out as a dense user x movie matrix.
///
/// Rows follow the order in which users first appear in the rating set.
/// Columns follow the catalog order passed to [`InteractionMatrix::build`],
/// through an explicit id to column table rather than the id value itself.
/// Unrated cells are 0; valid ratings start at 1 so the two never collide.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    pub matrix: Array2<f64>,
    /// Row index to user id
    pub users: Vec<UserId>,
    user_rows: HashMap<UserId, usize>,
    movie_columns: HashMap<MovieId, usize>,
}

impl InteractionMatrix {
    pub fn build(ratings: &[Rating], movie_ids: &[MovieId]) -> Self {
        let mut movie_columns = HashMap::with_capacity(movie_ids.len());
        for (col, id) in movie_ids.iter().enumerate() {
            movie_columns.entry(*id).or_insert(col);
        }

        let mut users = Vec::new();
        let mut user_rows = HashMap::new();
        for rating in ratings {
            user_rows.entry(rating.user_id).or_insert_with(|| {
                users.push(rating.user_id);
                users.len() - 1
            });
        }

        let mut matrix = Array2::<f64>::zeros((users.len(), movie_ids.len()));
        let mut skipped = 0usize;
        for rating in ratings {
            match movie_columns.get(&rating.movie_id) {
                Some(&col) => matrix[[user_rows[&rating.user_id], col]] = rating.rating,
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(skipped, "Ratings reference movies missing from the catalog");
        }

        Self {
            matrix,
            users,
            user_rows,
            movie_columns,
        }
    }

    /// Row holding `user_id`'s ratings, if the user rated anything
    pub fn user_row(&self, user_id: UserId) -> Option<usize> {
        self.user_rows.get(&user_id).copied()
    }

    pub fn movie_column(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_columns.get(&movie_id).copied()
    }
}
