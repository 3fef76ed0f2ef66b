use serde::{Deserialize, Serialize};

mod dataset;
mod profile;
mod recommendation;
mod report;

pub use dataset::Dataset;
pub use profile::{CharacteristicFavorite, GenreCount, PopularityTier, UserProfile};
pub use recommendation::{
    ContentBasedRecommendations, MovieRef, Neighbor, Recommendation, SimilarityResult,
    UserBasedRecommendations,
};
pub use report::{RatedMovie, SharedRating, SoulmateComparison, TasteReport};

pub type UserId = u32;
pub type MovieId = u32;

/// Top of the half-star rating scale
pub const MAX_RATING: f64 = 5.0;
/// Bottom of the half-star rating scale
pub const MIN_RATING: f64 = 0.5;

/// MovieLens marker for a movie without genre tags
const NO_GENRES: &str = "(no genres listed)";

/// A single user's rating of a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

/// Movie reference data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: MovieId,
    pub title: String,
    /// Distinct genre tags in source order
    pub genres: Vec<String>,
}

impl Movie {
    /// Creates a movie from its `|`-joined genre list
    pub fn new(movie_id: MovieId, title: impl Into<String>, genres: &str) -> Self {
        Self {
            movie_id,
            title: title.into(),
            genres: parse_genres(genres),
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Aggregate statistics for one movie, derived from the full rating set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub movie_id: MovieId,
    pub mean_rating: f64,
    pub rating_count: usize,
    /// Mean rating rescaled to 0-100, one decimal
    pub success_rate: f64,
}

impl MovieStats {
    /// Computes stats from the ratings a movie received
    pub fn from_ratings(movie_id: MovieId, ratings: impl IntoIterator<Item = f64>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));

        if count == 0 {
            return Self {
                movie_id,
                mean_rating: 0.0,
                rating_count: 0,
                success_rate: 0.0,
            };
        }

        let mean_rating = sum / count as f64;
        Self {
            movie_id,
            mean_rating,
            rating_count: count,
            success_rate: round1(mean_rating / MAX_RATING * 100.0),
        }
    }
}

/// Splits a `|`-joined genre list into distinct, trimmed tags
pub fn parse_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for tag in raw.split('|').map(str::trim) {
        if tag.is_empty() || tag == NO_GENRES {
            continue;
        }
        if !genres.iter().any(|g| g == tag) {
            genres.push(tag.to_string());
        }
    }
    genres
}

/// Rounds to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
