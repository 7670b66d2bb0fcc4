//! Genre-based content filtering.

use crate::models::{Movie, MovieId, Recommendation, ScoredRecommendation};

use super::genres::GenreFeatures;
use super::similarity::{cosine_similarity_matrix, most_similar};
use super::{RecommendError, MAX_RECOMMENDATIONS};

/// Ranks the movies whose genres are closest to `movie_id`'s.
///
/// The target itself is excluded by position. Ties keep catalog order.
pub fn recommend_similar(
    movie_id: MovieId,
    movies: &[Movie],
) -> Result<Vec<ScoredRecommendation>, RecommendError> {
    let features = GenreFeatures::build(movies);
    let target_row = features
        .movie_row(movie_id)
        .ok_or(RecommendError::MovieNotFound(movie_id))?;

    let similarity = cosine_similarity_matrix(&features.matrix);

    tracing::debug!(
        movie_id,
        movies = movies.len(),
        genres = features.genres.len(),
        "Computed genre similarity"
    );

    let recommendations = most_similar(&similarity, target_row, MAX_RECOMMENDATIONS)
        .into_iter()
        .map(|(row, score)| ScoredRecommendation {
            movie: Recommendation::from(&movies[row]),
            similarity_score: score,
        })
        .collect();

    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movie(id: MovieId, genres: &[&str]) -> Movie {
        Movie {
            id,
            tmdb_id: None,
            title: format!("Movie {}", id),
            overview: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            release_date: None,
            poster_path: None,
            vote_average: Some(6.5),
            popularity: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_shared_genre_ranks_first() {
        let movies = vec![
            movie(1, &["Action", "Drama"]),
            movie(2, &["Action"]),
            movie(3, &["Comedy"]),
        ];

        let result = recommend_similar(1, &movies).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].movie.id, 2);
        assert!(result[0].similarity_score > 0.0);
        assert!((result[0].similarity_score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        assert_eq!(result[1].movie.id, 3);
        assert_eq!(result[1].similarity_score, 0.0);
    }

    #[test]
    fn test_target_never_included() {
        // An identical twin scores 1.0 but the target itself must not appear
        let movies = vec![movie(1, &["Drama"]), movie(2, &["Drama"])];
        let result = recommend_similar(1, &movies).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].movie.id, 2);
        assert!((result[0].similarity_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_at_most_ten_and_ties_in_catalog_order() {
        let movies: Vec<Movie> = (1..=15).map(|id| movie(id, &["Western"])).collect();
        let result = recommend_similar(8, &movies).unwrap();

        let ids: Vec<MovieId> = result.iter().map(|r| r.movie.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 9, 10, 11]);
    }

    #[test]
    fn test_only_movie_in_catalog() {
        let result = recommend_similar(1, &[movie(1, &["Drama"])]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_movie() {
        let result = recommend_similar(4, &[movie(1, &["Drama"])]);
        assert!(matches!(result, Err(RecommendError::MovieNotFound(4))));
    }

    #[test]
    fn test_untagged_movies_score_zero() {
        let movies = vec![movie(1, &[]), movie(2, &["Drama"]), movie(3, &[])];
        let result = recommend_similar(1, &movies).unwrap();
        assert!(result.iter().all(|r| r.similarity_score == 0.0));
        assert_eq!(result.len(), 2);
    }
}
