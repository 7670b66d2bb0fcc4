//! Cosine similarity over matrix rows.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis};

/// Cosine similarity of two equally long vectors.
///
/// A zero vector is orthogonal to everything, itself included, so 0/0 is 0.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let denom = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        a.dot(&b) / denom
    }
}

/// Pairwise cosine similarity of every row of `matrix`.
///
/// The result is R x R for R input rows. Only the upper triangle is computed
/// and mirrored, so `sim[[i, j]] == sim[[j, i]]` holds exactly.
pub fn cosine_similarity_matrix(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();
    let norms = matrix.map_axis(Axis(1), |row| row.dot(&row).sqrt());
    let mut sim = Array2::<f64>::zeros((n, n));

    for (i, row_i) in matrix.rows().into_iter().enumerate() {
        for j in i..n {
            let denom = norms[i] * norms[j];
            let value = if denom == 0.0 {
                0.0
            } else {
                row_i.dot(&matrix.row(j)) / denom
            };
            sim[[i, j]] = value;
            sim[[j, i]] = value;
        }
    }

    sim
}

/// Ranks the rows most similar to `row`, excluding `row` itself by index.
///
/// Returns up to `limit` (index, similarity) pairs, highest similarity first.
/// The sort is stable, so ties keep ascending index order.
pub fn most_similar(sim: &Array2<f64>, row: usize, limit: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = sim
        .row(row)
        .iter()
        .copied()
        .enumerate()
        .filter(|(idx, _)| *idx != row)
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}
