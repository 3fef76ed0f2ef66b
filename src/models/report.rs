use serde::{Deserialize, Serialize};

use super::{
    ContentBasedRecommendations, MovieRef, Recommendation, UserBasedRecommendations, UserId,
    UserProfile,
};

/// A movie together with one user's rating of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedMovie {
    pub movie: MovieRef,
    pub rating: f64,
}

/// A movie both users rated, ratings side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedRating {
    pub movie: MovieRef,
    pub target_rating: f64,
    pub soulmate_rating: f64,
}

/// The target user next to their taste twin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulmateComparison {
    pub user_id: UserId,
    pub soulmate_id: UserId,
    pub similarity: f64,
    /// `similarity * 100`, one decimal
    pub similarity_pct: f64,
    pub user_top_rated: Vec<RatedMovie>,
    pub soulmate_top_rated: Vec<RatedMovie>,
    pub shared_ratings: Vec<SharedRating>,
}

/// Everything the explorer shows for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteReport {
    pub user_id: UserId,
    pub soulmate: SoulmateComparison,
    pub user_based: UserBasedRecommendations,
    pub item_based: Vec<Recommendation>,
    pub content_based: ContentBasedRecommendations,
    pub profile: UserProfile,
}
