use serde::{Deserialize, Serialize};

use super::{MovieRef, UserId};

/// Descriptive statistics about one user's ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub watched_count: usize,
    /// Movies rated exactly 5.0
    pub favorite_count: usize,
    /// Mean personal rating on a 0-100 scale
    pub satisfaction_pct: f64,
    /// Mean success rate of the watched movies
    pub avg_success_pct: f64,
    pub genre_distribution: Vec<GenreCount>,
    pub characteristic_favorites: Vec<CharacteristicFavorite>,
    /// Mean rating count of the watched movies
    pub mean_rating_count: f64,
    pub popularity: PopularityTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// A movie the user values well above its consensus success rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicFavorite {
    pub movie: MovieRef,
    pub rating: f64,
    pub success_rate: f64,
    /// `rating * 20 - success_rate`
    pub diff: f64,
}

/// How mainstream a user's watch history is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopularityTier {
    Niche,
    Balanced,
    Mainstream,
}

impl PopularityTier {
    /// Classifies a mean rating count against the two band limits
    pub fn classify(mean_rating_count: f64, niche_below: f64, balanced_below: f64) -> Self {
        if mean_rating_count < niche_below {
            PopularityTier::Niche
        } else if mean_rating_count < balanced_below {
            PopularityTier::Balanced
        } else {
            PopularityTier::Mainstream
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        assert_eq!(PopularityTier::classify(12.0, 60.0, 100.0), PopularityTier::Niche);
        assert_eq!(PopularityTier::classify(60.0, 60.0, 100.0), PopularityTier::Balanced);
        assert_eq!(PopularityTier::classify(99.9, 60.0, 100.0), PopularityTier::Balanced);
        assert_eq!(PopularityTier::classify(100.0, 60.0, 100.0), PopularityTier::Mainstream);
    }

    #[test]
    fn test_tier_serialization() {
        let json = serde_json::to_string(&PopularityTier::Mainstream).unwrap();
        assert_eq!(json, "\"mainstream\"");
    }
}
