use std::path::PathBuf;

use serde::Deserialize;

use crate::services::{
    RecommenderSettings, DEFAULT_BALANCED_BELOW, DEFAULT_MIN_VOTES, DEFAULT_NICHE_BELOW,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Ratings CSV (userId, movieId, rating)
    #[serde(default = "default_ratings_path")]
    pub ratings_path: PathBuf,

    /// Movies CSV (movieId, title, genres)
    #[serde(default = "default_movies_path")]
    pub movies_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Movies need strictly more ratings than this to join the similarity matrix
    #[serde(default = "default_min_votes")]
    pub min_votes: usize,

    /// Mean rating count below which a profile is labelled niche
    #[serde(default = "default_niche_below")]
    pub niche_below: f64,

    /// Mean rating count below which a profile is labelled balanced
    #[serde(default = "default_balanced_below")]
    pub balanced_below: f64,
}

fn default_ratings_path() -> PathBuf {
    PathBuf::from("data/ratings.csv")
}

fn default_movies_path() -> PathBuf {
    PathBuf::from("data/movies.csv")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_min_votes() -> usize {
    DEFAULT_MIN_VOTES
}

fn default_niche_below() -> f64 {
    DEFAULT_NICHE_BELOW
}

fn default_balanced_below() -> f64 {
    DEFAULT_BALANCED_BELOW
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.niche_below > config.balanced_below {
            anyhow::bail!(
                "NICHE_BELOW ({}) must not exceed BALANCED_BELOW ({})",
                config.niche_below,
                config.balanced_below
            );
        }

        Ok(config)
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn recommender_settings(&self) -> RecommenderSettings {
        RecommenderSettings {
            min_votes: self.min_votes,
            niche_below: self.niche_below,
            balanced_below: self.balanced_below,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.ratings_path, PathBuf::from("data/ratings.csv"));
        assert_eq!(config.movies_path, PathBuf::from("data/movies.csv"));
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.recommender_settings(), RecommenderSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("RATINGS_PATH", "/srv/ml/ratings.csv"),
            ("PORT", "8080"),
            ("MIN_VOTES", "50"),
            ("NICHE_BELOW", "40"),
        ]))
        .unwrap();

        assert_eq!(config.ratings_path, PathBuf::from("/srv/ml/ratings.csv"));
        assert_eq!(config.port, 8080);
        let settings = config.recommender_settings();
        assert_eq!(settings.min_votes, 50);
        assert_eq!(settings.niche_below, 40.0);
        assert_eq!(settings.balanced_below, 100.0);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Config::from_vars(vars(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_inverted_bands_rejected() {
        let result = Config::from_vars(vars(&[("NICHE_BELOW", "150")]));
        assert!(result.is_err());
    }
}
