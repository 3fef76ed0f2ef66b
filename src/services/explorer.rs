use std::cmp::Ordering;
use std::time::Instant;

use crate::{
    error::{EngineError, EngineResult},
    models::{
        round1, Dataset, MovieId, MovieRef, RatedMovie, SharedRating, SimilarityResult,
        SoulmateComparison, TasteReport, UserId,
    },
    services::recommendations::Recommender,
};

pub const TOP_RATED_LIMIT: usize = 5;
pub const SHARED_RATINGS_LIMIT: usize = 10;

/// A user's highest-rated movies, ties by movie id
pub fn top_rated(dataset: &Dataset, user_id: UserId, limit: usize) -> EngineResult<Vec<RatedMovie>> {
    let rated = dataset.require_user(user_id)?;

    let mut ranked: Vec<(MovieId, f64)> = rated.iter().map(|(&m, &r)| (m, r)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    Ok(ranked
        .into_iter()
        .filter_map(|(movie_id, rating)| {
            let movie = dataset.movie(movie_id)?;
            Some(RatedMovie {
                movie: MovieRef::from(movie),
                rating,
            })
        })
        .take(limit)
        .collect())
}

/// Movies both users rated, in movie id order
pub fn shared_ratings(
    dataset: &Dataset,
    user_id: UserId,
    other_id: UserId,
    limit: usize,
) -> EngineResult<Vec<SharedRating>> {
    let mine = dataset.require_user(user_id)?;
    let theirs = dataset.require_user(other_id)?;

    Ok(mine
        .iter()
        .filter_map(|(movie_id, &target_rating)| {
            let soulmate_rating = *theirs.get(movie_id)?;
            let movie = dataset.movie(*movie_id)?;
            Some(SharedRating {
                movie: MovieRef::from(movie),
                target_rating,
                soulmate_rating,
            })
        })
        .take(limit)
        .collect())
}

/// Side-by-side view of the target and the head of `ranking`
pub fn compare_with_soulmate(
    dataset: &Dataset,
    ranking: &SimilarityResult,
) -> EngineResult<SoulmateComparison> {
    let soulmate = ranking.soulmate().ok_or_else(|| {
        EngineError::InsufficientData("no other user to compare with".to_string())
    })?;

    Ok(SoulmateComparison {
        user_id: ranking.target,
        soulmate_id: soulmate.user_id,
        similarity: soulmate.score,
        similarity_pct: round1(soulmate.score * 100.0),
        user_top_rated: top_rated(dataset, ranking.target, TOP_RATED_LIMIT)?,
        soulmate_top_rated: top_rated(dataset, soulmate.user_id, TOP_RATED_LIMIT)?,
        shared_ratings: shared_ratings(
            dataset,
            ranking.target,
            soulmate.user_id,
            SHARED_RATINGS_LIMIT,
        )?,
    })
}

/// Finds the taste twin and compares the two users
pub fn soulmate(recommender: &Recommender<'_>, user_id: UserId) -> EngineResult<SoulmateComparison> {
    let ranking = recommender.similarity(user_id)?;
    compare_with_soulmate(recommender.dataset(), &ranking)
}

/// Builds the full report for one user
///
/// The similarity ranking is computed once and shared by the soulmate view and
/// the user-based list.
pub fn explore(recommender: &Recommender<'_>, user_id: UserId) -> EngineResult<TasteReport> {
    let start = Instant::now();

    let ranking = recommender.similarity(user_id)?;
    let soulmate = compare_with_soulmate(recommender.dataset(), &ranking)?;
    let user_based = recommender.user_based_from(&ranking)?;
    let item_based = recommender.item_based(user_id)?;
    let content_based = recommender.content_based(user_id)?;
    let profile = recommender.profile(user_id)?;

    tracing::info!(
        user_id,
        soulmate_id = soulmate.soulmate_id,
        similarity_pct = soulmate.similarity_pct,
        user_based = user_based.recommendations.len(),
        item_based = item_based.len(),
        content_based = content_based.recommendations.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Taste report built"
    );

    Ok(TasteReport {
        user_id,
        soulmate,
        user_based,
        item_based,
        content_based,
        profile,
    })
}
