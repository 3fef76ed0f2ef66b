use std::cmp::Ordering;

use crate::{
    error::EngineResult,
    models::{
        round1, CharacteristicFavorite, GenreCount, MovieRef, PopularityTier, UserId,
        UserProfile, MAX_RATING,
    },
    services::recommendations::{Recommender, RESULT_LIMIT},
};

/// Ratings at or above this qualify as characteristic favourites
pub const FAVORITE_MIN_RATING: f64 = 4.0;

/// Scales a rating onto the 0-100 success rate scale
const RATING_TO_PCT: f64 = 100.0 / MAX_RATING;

impl<'a> Recommender<'a> {
    /// Descriptive statistics about the target's ratings
    ///
    /// Characteristic favourites are the 4+ movies where the user's scaled
    /// rating beats the consensus success rate by the widest margin.
    pub fn profile(&self, target: UserId) -> EngineResult<UserProfile> {
        let dataset = self.dataset();
        let settings = self.settings();
        let rated = dataset.require_user(target)?;

        let watched_count = rated.len();
        let favorite_count = rated.values().filter(|&&r| r == MAX_RATING).count();
        let satisfaction_pct = mean(rated.values().copied()) / MAX_RATING * 100.0;
        let avg_success_pct = mean(rated.keys().map(|&m| dataset.success_rate(m)));
        let mean_rating_count = mean(
            rated
                .keys()
                .filter_map(|&m| dataset.stats(m))
                .map(|s| s.rating_count as f64),
        );

        let mut genre_distribution: Vec<GenreCount> = self
            .genre_counts(rated.keys().copied())
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect();
        // stable sort keeps the alphabetical order of equal counts
        genre_distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let mut characteristic_favorites: Vec<CharacteristicFavorite> = rated
            .iter()
            .filter(|&(_, &r)| r >= FAVORITE_MIN_RATING)
            .filter_map(|(&movie_id, &rating)| {
                let movie = dataset.movie(movie_id)?;
                let success_rate = dataset.success_rate(movie_id);
                Some(CharacteristicFavorite {
                    movie: MovieRef::from(movie),
                    rating,
                    success_rate,
                    diff: round1(rating * RATING_TO_PCT - success_rate),
                })
            })
            .collect();
        characteristic_favorites.sort_by(|a, b| {
            b.diff
                .partial_cmp(&a.diff)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.movie.movie_id.cmp(&b.movie.movie_id))
        });
        characteristic_favorites.truncate(RESULT_LIMIT);

        Ok(UserProfile {
            user_id: target,
            watched_count,
            favorite_count,
            satisfaction_pct,
            avg_success_pct,
            genre_distribution,
            characteristic_favorites,
            mean_rating_count,
            popularity: PopularityTier::classify(
                mean_rating_count,
                settings.niche_below,
                settings.balanced_below,
            ),
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
