use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::Dataset;
use crate::services::{Recommender, RecommenderSettings};

/// Shared application state
///
/// The dataset is immutable after load, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub dataset: Dataset,
    pub settings: RecommenderSettings,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    /// Wraps a loaded dataset for serving
    pub fn new(dataset: Dataset, settings: RecommenderSettings) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                dataset,
                settings,
                loaded_at: Utc::now(),
            }),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.inner.dataset
    }

    pub fn recommender(&self) -> Recommender<'_> {
        Recommender::new(&self.inner.dataset, &self.inner.settings)
    }
}
