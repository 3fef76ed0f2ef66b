pub mod explorer;
pub mod loader;
pub mod matrix;
pub mod profile;
pub mod recommendations;
pub mod similarity;

pub use matrix::{build_matrix, UserItemMatrix, DEFAULT_MIN_VOTES};
pub use recommendations::{
    Recommender, RecommenderSettings, DEFAULT_BALANCED_BELOW, DEFAULT_NICHE_BELOW,
};
pub use similarity::{cosine_similarity, rank_by_similarity};
