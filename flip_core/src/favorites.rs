//! In-memory set of favorited card ids.
//!
//! The set is mutated optimistically before the backing store confirms;
//! the engine flips it back if the store write fails, since the favorite
//! icon is directly user-visible state.

use crate::CardId;
use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
pub struct FavoriteTracker {
    ids: HashSet<CardId>,
}

impl FavoriteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set, e.g. from a fresh store listing
    pub fn replace(&mut self, ids: HashSet<CardId>) {
        self.ids = ids;
    }

    pub fn contains(&self, card_id: &CardId) -> bool {
        self.ids.contains(card_id)
    }

    /// Flip membership, returning the new state (true = now favorited)
    pub fn toggle(&mut self, card_id: CardId) -> bool {
        if self.ids.remove(&card_id) {
            false
        } else {
            self.ids.insert(card_id);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
