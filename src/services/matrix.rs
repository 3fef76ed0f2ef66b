use std::collections::BTreeMap;

use crate::{
    error::{EngineError, EngineResult},
    models::{Dataset, MovieId, UserId},
};

/// Default popularity threshold: items need strictly more ratings than this
pub const DEFAULT_MIN_VOTES: usize = 30;

/// Dense user x item rating matrix over the popular items
///
/// Columns are movie ids in ascending order, rows are user ids in ascending
/// order. A missing rating is stored as 0.0, which never collides with a real
/// rating because the scale starts at 0.5.
#[derive(Debug, Clone, PartialEq)]
pub struct UserItemMatrix {
    items: Vec<MovieId>,
    rows: BTreeMap<UserId, Vec<f64>>,
}

impl UserItemMatrix {
    /// Movie ids backing each column
    pub fn items(&self) -> &[MovieId] {
        &self.items
    }

    pub fn row(&self, user_id: UserId) -> Option<&[f64]> {
        self.rows.get(&user_id).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = (UserId, &[f64])> {
        self.rows.iter().map(|(&id, row)| (id, row.as_slice()))
    }

    pub fn user_count(&self) -> usize {
        self.rows.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Builds the matrix over movies rated by more than `min_votes` users
///
/// Every user in the dataset gets a row, even one that rated none of the
/// selected items. Fails with [`EngineError::InsufficientData`] if the
/// threshold removes every item.
pub fn build_matrix(dataset: &Dataset, min_votes: usize) -> EngineResult<UserItemMatrix> {
    let items: Vec<MovieId> = dataset
        .all_stats()
        .filter(|s| s.rating_count > min_votes)
        .map(|s| s.movie_id)
        .collect();

    if items.is_empty() {
        return Err(EngineError::InsufficientData(format!(
            "no movie has more than {} ratings",
            min_votes
        )));
    }

    let column: BTreeMap<MovieId, usize> = items
        .iter()
        .enumerate()
        .map(|(idx, &movie_id)| (movie_id, idx))
        .collect();

    let mut rows = BTreeMap::new();
    for user_id in dataset.user_ids() {
        let mut row = vec![0.0; items.len()];
        if let Some(rated) = dataset.user_ratings(user_id) {
            for (movie_id, &rating) in rated {
                if let Some(&idx) = column.get(movie_id) {
                    row[idx] = rating;
                }
            }
        }
        rows.insert(user_id, row);
    }

    Ok(UserItemMatrix { items, rows })
}
