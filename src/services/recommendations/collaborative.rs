//! User-based collaborative filtering.

use std::collections::{HashMap, HashSet};

use crate::models::{Movie, MovieId, Rating, Recommendation, UserId};

use super::interaction::InteractionMatrix;
use super::similarity::{cosine_similarity_matrix, most_similar};
use super::{RecommendError, MAX_RECOMMENDATIONS, MIN_NEIGHBOR_RATING, NEIGHBOR_COUNT};

/// Recommends movies that `user_id`'s nearest neighbors rated highly.
///
/// Neighbors are the [`NEIGHBOR_COUNT`] most similar other users. Each
/// neighbor contributes, in the order it rated them, the movies it scored at
/// least [`MIN_NEIGHBOR_RATING`] that the target has not rated. Candidates
/// are concatenated by neighbor rank without deduplication, so a movie liked
/// by two neighbors appears twice.
pub fn recommend_for_user(
    user_id: UserId,
    ratings: &[Rating],
    movies: &[Movie],
) -> Result<Vec<Recommendation>, RecommendError> {
    let movie_ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
    let interactions = InteractionMatrix::build(ratings, &movie_ids);

    let target_row = interactions
        .user_row(user_id)
        .ok_or(RecommendError::UserNotFound(user_id))?;

    let similarity = cosine_similarity_matrix(&interactions.matrix);
    let neighbors = most_similar(&similarity, target_row, NEIGHBOR_COUNT);

    tracing::debug!(
        user_id,
        users = interactions.users.len(),
        movies = movie_ids.len(),
        neighbors = neighbors.len(),
        "Computed user neighborhood"
    );

    // Each user's ratings, still in recorded order
    let mut by_user: HashMap<UserId, Vec<&Rating>> = HashMap::new();
    for rating in ratings {
        by_user.entry(rating.user_id).or_default().push(rating);
    }

    let already_rated: HashSet<MovieId> = by_user
        .get(&user_id)
        .into_iter()
        .flatten()
        .map(|r| r.movie_id)
        .collect();
    let catalog: HashMap<MovieId, &Movie> = movies.iter().map(|m| (m.id, m)).collect();

    let recommendations = neighbors
        .iter()
        .map(|(row, _)| interactions.users[*row])
        .flat_map(|neighbor| by_user.get(&neighbor).into_iter().flatten())
        .filter(|r| r.rating >= MIN_NEIGHBOR_RATING && !already_rated.contains(&r.movie_id))
        .filter_map(|r| catalog.get(&r.movie_id))
        .take(MAX_RECOMMENDATIONS)
        .map(|movie| Recommendation::from(*movie))
        .collect();

    Ok(recommendations)
}
