use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::{
    error::{EngineError, EngineResult},
    models::{
        ContentBasedRecommendations, Dataset, MovieId, MovieRef, Recommendation,
        SimilarityResult, UserBasedRecommendations, UserId,
    },
    services::{matrix, similarity},
};

/// Recommendation lists never exceed this length
pub const RESULT_LIMIT: usize = 5;
/// Minimum soulmate rating for a movie to be passed on
pub const SOULMATE_PICK_MIN: f64 = 4.5;
/// Minimum rating that makes a user a fan of a seed item
pub const FAN_MIN_RATING: f64 = 4.5;
/// Seeds fall back to ratings at or above this when there are too few 5-star ones
pub const SEED_FALLBACK_MIN: f64 = 4.0;
pub const MIN_FIVE_STAR_SEEDS: usize = 3;
pub const MAX_SEEDS: usize = 5;

/// Default mean rating count below which a profile is niche
pub const DEFAULT_NICHE_BELOW: f64 = 60.0;
/// Default mean rating count below which a profile is balanced
pub const DEFAULT_BALANCED_BELOW: f64 = 100.0;

const FIVE_STARS: f64 = 5.0;

/// Tunable engine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderSettings {
    /// Items need strictly more ratings than this to enter the similarity matrix
    pub min_votes: usize,
    /// Mean rating count below which a profile is niche
    pub niche_below: f64,
    /// Mean rating count below which a profile is balanced
    pub balanced_below: f64,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            min_votes: matrix::DEFAULT_MIN_VOTES,
            niche_below: DEFAULT_NICHE_BELOW,
            balanced_below: DEFAULT_BALANCED_BELOW,
        }
    }
}

/// Stateless recommendation engine over a borrowed dataset
///
/// Every method is a pure function of the user id and the borrowed data, so
/// the strategies can run in any order or concurrently.
pub struct Recommender<'a> {
    dataset: &'a Dataset,
    settings: &'a RecommenderSettings,
}

impl<'a> Recommender<'a> {
    pub fn new(dataset: &'a Dataset, settings: &'a RecommenderSettings) -> Self {
        Self { dataset, settings }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn settings(&self) -> &'a RecommenderSettings {
        self.settings
    }

    /// Ranks all other users by similarity over the popular-item matrix
    pub fn similarity(&self, target: UserId) -> EngineResult<SimilarityResult> {
        self.dataset.require_user(target)?;
        let matrix = matrix::build_matrix(self.dataset, self.settings.min_votes)?;
        similarity::rank_by_similarity(&matrix, target)
    }

    /// Movies the taste twin loved that the target has not seen
    pub fn user_based(&self, target: UserId) -> EngineResult<UserBasedRecommendations> {
        let ranking = self.similarity(target)?;
        self.user_based_from(&ranking)
    }

    /// User-based recommendations from an already computed ranking
    pub fn user_based_from(
        &self,
        ranking: &SimilarityResult,
    ) -> EngineResult<UserBasedRecommendations> {
        let soulmate = ranking.soulmate().ok_or_else(|| {
            EngineError::InsufficientData("no other user to compare with".to_string())
        })?;
        let target_rated = self.dataset.require_user(ranking.target)?;
        let soulmate_rated = self.dataset.require_user(soulmate.user_id)?;

        let candidates = soulmate_rated
            .iter()
            .filter(|&(movie_id, &rating)| {
                rating >= SOULMATE_PICK_MIN && !target_rated.contains_key(movie_id)
            })
            .map(|(&movie_id, _)| movie_id);

        Ok(UserBasedRecommendations {
            soulmate_id: soulmate.user_id,
            similarity: soulmate.score,
            recommendations: self.top_by_success_rate(candidates),
        })
    }

    /// Movies that fans of the target's favourites also rated
    ///
    /// Seeds are the target's 5-star movies, or their 4+ movies when fewer
    /// than three 5-star ratings exist. Each fan-rating of another movie counts
    /// once toward its match count, summed over all seeds.
    pub fn item_based(&self, target: UserId) -> EngineResult<Vec<Recommendation>> {
        let target_rated = self.dataset.require_user(target)?;
        let seeds = seed_items(target_rated);

        let mut match_counts: HashMap<MovieId, usize> = HashMap::new();
        for &seed in &seeds {
            let Some(raters) = self.dataset.movie_ratings(seed) else {
                continue;
            };
            let fans = raters
                .iter()
                .filter(|&(&user_id, &rating)| user_id != target && rating >= FAN_MIN_RATING)
                .map(|(&user_id, _)| user_id);

            for fan in fans {
                let Some(fan_rated) = self.dataset.user_ratings(fan) else {
                    continue;
                };
                for &movie_id in fan_rated.keys().filter(|&&m| m != seed) {
                    *match_counts.entry(movie_id).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(MovieId, usize, f64)> = match_counts
            .into_iter()
            .filter(|(movie_id, _)| !target_rated.contains_key(movie_id))
            .map(|(movie_id, count)| (movie_id, count, self.dataset.success_rate(movie_id)))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(ranked
            .into_iter()
            .take(RESULT_LIMIT)
            .filter_map(|(movie_id, count, _)| self.recommendation(movie_id, Some(count)))
            .collect())
    }

    /// Best-rated unseen movies of the target's most frequent genre
    pub fn content_based(&self, target: UserId) -> EngineResult<ContentBasedRecommendations> {
        let target_rated = self.dataset.require_user(target)?;

        let Some(genre) = dominant_genre(self.genre_counts(target_rated.keys().copied())) else {
            return Ok(ContentBasedRecommendations {
                dominant_genre: None,
                recommendations: Vec::new(),
            });
        };

        let candidates = self
            .dataset
            .movies()
            .filter(|m| m.has_genre(&genre) && !target_rated.contains_key(&m.movie_id))
            .map(|m| m.movie_id);

        Ok(ContentBasedRecommendations {
            recommendations: self.top_by_success_rate(candidates),
            dominant_genre: Some(genre),
        })
    }

    /// Tag frequencies over the given movies, every tag of every movie counted
    pub(crate) fn genre_counts(
        &self,
        movie_ids: impl Iterator<Item = MovieId>,
    ) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for movie in movie_ids.filter_map(|id| self.dataset.movie(id)) {
            for genre in &movie.genres {
                *counts.entry(genre.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    fn recommendation(
        &self,
        movie_id: MovieId,
        match_count: Option<usize>,
    ) -> Option<Recommendation> {
        let movie = self.dataset.movie(movie_id)?;
        Some(Recommendation {
            movie: MovieRef::from(movie),
            success_rate: self.dataset.success_rate(movie_id),
            match_count,
        })
    }

    fn top_by_success_rate(&self, candidates: impl Iterator<Item = MovieId>) -> Vec<Recommendation> {
        let mut ranked: Vec<(MovieId, f64)> = candidates
            .map(|movie_id| (movie_id, self.dataset.success_rate(movie_id)))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        ranked
            .into_iter()
            .take(RESULT_LIMIT)
            .filter_map(|(movie_id, _)| self.recommendation(movie_id, None))
            .collect()
    }
}

/// Picks up to [`MAX_SEEDS`] seed items, highest rating first
fn seed_items(rated: &BTreeMap<MovieId, f64>) -> Vec<MovieId> {
    let five_star = rated.values().filter(|&&r| r == FIVE_STARS).count();
    let min_rating = if five_star < MIN_FIVE_STAR_SEEDS {
        SEED_FALLBACK_MIN
    } else {
        FIVE_STARS
    };

    let mut seeds: Vec<(MovieId, f64)> = rated
        .iter()
        .filter(|&(_, &r)| r >= min_rating)
        .map(|(&movie_id, &r)| (movie_id, r))
        .collect();

    seeds.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    seeds.truncate(MAX_SEEDS);
    seeds.into_iter().map(|(movie_id, _)| movie_id).collect()
}

/// Most frequent tag; ties go to the alphabetically first one
fn dominant_genre(counts: BTreeMap<String, usize>) -> Option<String> {
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(genre, _)| genre)
}
