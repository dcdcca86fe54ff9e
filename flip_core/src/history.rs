//! Undo stack over swipe actions.
//!
//! Each swipe (and each explicit skip, which counts as a left swipe)
//! pushes one entry recording the cursor position it was made from.
//! Undo pops the top entry and restores exactly that cursor, so the
//! stack length always equals the number of swipes not yet undone.

use crate::{CardId, SwipeDirection};

/// One recorded swipe action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub cursor_before: usize,
    pub direction: SwipeDirection,
    pub card_id: CardId,
    /// Whether this swipe was the one that incremented the deduplicated
    /// left counter; only such an entry decrements it again on undo.
    pub counted_left: bool,
}

/// Stack of swipe actions available for undo
#[derive(Clone, Debug, Default)]
pub struct ReviewHistory {
    entries: Vec<HistoryEntry>,
}

impl ReviewHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
