use serde::{Deserialize, Serialize};

use super::{Movie, MovieId, UserId};

/// Movie identity carried by every engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRef {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
}

impl From<&Movie> for MovieRef {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
        }
    }
}

/// A recommended movie and the key it was ranked by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub movie: MovieRef,
    pub success_rate: f64,
    /// Fan-ratings pointing at this movie (item-based only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
}

impl Recommendation {
    pub fn movie_id(&self) -> MovieId {
        self.movie.movie_id
    }
}

/// One neighbour in a similarity ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub user_id: UserId,
    pub score: f64,
}

/// Other users ranked by cosine similarity to a target
///
/// Ordered by score descending, ties by ascending user id. Never contains
/// the target itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub target: UserId,
    pub neighbors: Vec<Neighbor>,
}

impl SimilarityResult {
    /// The nearest neighbour (taste twin)
    pub fn soulmate(&self) -> Option<Neighbor> {
        self.neighbors.first().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBasedRecommendations {
    pub soulmate_id: UserId,
    pub similarity: f64,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBasedRecommendations {
    /// `None` when none of the user's movies carry a genre tag
    pub dominant_genre: Option<String>,
    pub recommendations: Vec<Recommendation>,
}
