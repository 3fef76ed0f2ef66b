use std::cmp::Ordering;

use crate::{
    error::{EngineError, EngineResult},
    models::{Neighbor, SimilarityResult, UserId},
    services::matrix::UserItemMatrix,
};

/// Cosine similarity `dot(a, b) / (|a| * |b|)`
///
/// Returns 0.0 when either vector has zero norm, so a user who rated none of
/// the matrix items is dissimilar to everyone instead of producing NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Ranks every other user by similarity to `target`
///
/// The target is excluded by id. Ties on score are broken by ascending user
/// id, so the soulmate is deterministic.
pub fn rank_by_similarity(
    matrix: &UserItemMatrix,
    target: UserId,
) -> EngineResult<SimilarityResult> {
    let target_row = matrix.row(target).ok_or(EngineError::UnknownUser(target))?;

    if matrix.user_count() < 2 {
        return Err(EngineError::InsufficientData(
            "similarity needs at least two users".to_string(),
        ));
    }

    let mut neighbors: Vec<Neighbor> = matrix
        .rows()
        .filter(|(user_id, _)| *user_id != target)
        .map(|(user_id, row)| Neighbor {
            user_id,
            score: cosine_similarity(target_row, row),
        })
        .collect();

    neighbors.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    Ok(SimilarityResult { target, neighbors })
}
