//! Abstract collaborator interfaces for the review engine.
//!
//! The engine never talks to a concrete backend: it sees a
//! [`ProgressStore`] for due-card queries and status writes, a
//! [`FavoriteStore`] for per-user favorite persistence, and a
//! [`UserSession`] for identity. The in-memory implementations here back
//! the unit tests (with failure injection) and seed the demo deck; the
//! file-backed deck store lives in [`crate::deck_store`].

use crate::{CardId, Result, ReviewCard, ReviewStatus, UserId};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Persistent review progress, keyed by card
pub trait ProgressStore {
    /// Cards of a deck (optionally one chapter) that are due now:
    /// status not terminal and `next_review_at` elapsed or unset.
    fn fetch_due_cards(&self, deck_id: &str, chapter_id: Option<&str>) -> Result<Vec<ReviewCard>>;

    /// Write a card's status and optional next-review timestamp
    fn update_status(
        &mut self,
        card_id: CardId,
        status: ReviewStatus,
        next_review_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Count cards of a deck (optionally one chapter) in a given status
    fn count_by_status(
        &self,
        deck_id: &str,
        chapter_id: Option<&str>,
        status: ReviewStatus,
    ) -> Result<usize>;
}

/// Per-user favorite card persistence
pub trait FavoriteStore {
    fn list(&self, user_id: &UserId) -> Result<HashSet<CardId>>;
    fn add(&mut self, user_id: &UserId, card_id: CardId) -> Result<()>;
    fn remove(&mut self, user_id: &UserId, card_id: CardId) -> Result<()>;
}

/// Identity resolution for the current session
pub trait UserSession {
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed identity, enough for a single-user host
#[derive(Clone, Debug)]
pub struct StaticUserSession(pub UserId);

impl UserSession for StaticUserSession {
    fn current_user(&self) -> Option<UserId> {
        Some(self.0.clone())
    }
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// One card's persisted record in the in-memory store
#[derive(Clone, Debug)]
pub struct StoredCard {
    pub card: ReviewCard,
    pub deck_id: String,
    pub chapter_id: Option<String>,
    pub status: ReviewStatus,
    pub next_review_at: Option<DateTime<Utc>>,
}

/// In-memory progress store with failure injection for tests
#[derive(Clone, Debug, Default)]
pub struct MemoryProgressStore {
    cards: HashMap<CardId, StoredCard>,
    pub fail_fetches: bool,
    pub fail_updates: bool,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_card(
        &mut self,
        card: ReviewCard,
        deck_id: &str,
        chapter_id: Option<&str>,
        status: ReviewStatus,
    ) {
        self.cards.insert(
            card.id,
            StoredCard {
                card,
                deck_id: deck_id.to_string(),
                chapter_id: chapter_id.map(|c| c.to_string()),
                status,
                next_review_at: None,
            },
        );
    }

    pub fn get(&self, card_id: &CardId) -> Option<&StoredCard> {
        self.cards.get(card_id)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn fetch_due_cards(&self, deck_id: &str, chapter_id: Option<&str>) -> Result<Vec<ReviewCard>> {
        if self.fail_fetches {
            return Err(crate::Error::Store("fetch unavailable".into()));
        }

        let now = Utc::now();
        let mut due: Vec<_> = self
            .cards
            .values()
            .filter(|entry| entry.deck_id == deck_id)
            .filter(|entry| chapter_id.is_none() || entry.chapter_id.as_deref() == chapter_id)
            .filter(|entry| entry.status != ReviewStatus::Learned)
            .filter(|entry| entry.next_review_at.map_or(true, |at| at <= now))
            .map(|entry| entry.card.clone())
            .collect();

        // Deterministic order for callers; the queue does its own shuffling
        due.sort_by_key(|card| card.id);
        Ok(due)
    }

    fn update_status(
        &mut self,
        card_id: CardId,
        status: ReviewStatus,
        next_review_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if self.fail_updates {
            return Err(crate::Error::Store("update unavailable".into()));
        }

        let entry = self
            .cards
            .get_mut(&card_id)
            .ok_or_else(|| crate::Error::Store(format!("Unknown card: {}", card_id)))?;
        entry.status = status;
        entry.next_review_at = next_review_at;
        Ok(())
    }

    fn count_by_status(
        &self,
        deck_id: &str,
        chapter_id: Option<&str>,
        status: ReviewStatus,
    ) -> Result<usize> {
        if self.fail_fetches {
            return Err(crate::Error::Store("count unavailable".into()));
        }

        Ok(self
            .cards
            .values()
            .filter(|entry| entry.deck_id == deck_id)
            .filter(|entry| chapter_id.is_none() || entry.chapter_id.as_deref() == chapter_id)
            .filter(|entry| entry.status == status)
            .count())
    }
}

/// In-memory favorite store with failure injection for tests
#[derive(Clone, Debug, Default)]
pub struct MemoryFavoriteStore {
    favorites: HashMap<UserId, HashSet<CardId>>,
    pub fail_writes: bool,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoriteStore for MemoryFavoriteStore {
    fn list(&self, user_id: &UserId) -> Result<HashSet<CardId>> {
        Ok(self.favorites.get(user_id).cloned().unwrap_or_default())
    }

    fn add(&mut self, user_id: &UserId, card_id: CardId) -> Result<()> {
        if self.fail_writes {
            return Err(crate::Error::Store("favorite add unavailable".into()));
        }
        self.favorites
            .entry(user_id.clone())
            .or_default()
            .insert(card_id);
        Ok(())
    }

    fn remove(&mut self, user_id: &UserId, card_id: CardId) -> Result<()> {
        if self.fail_writes {
            return Err(crate::Error::Store("favorite remove unavailable".into()));
        }
        if let Some(set) = self.favorites.get_mut(user_id) {
            set.remove(&card_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn card(label: &str) -> ReviewCard {
        ReviewCard::new(CardId::new(), serde_json::json!({ "front": label }))
    }

    #[test]
    fn test_fetch_due_excludes_learned() {
        let mut store = MemoryProgressStore::new();
        store.insert_card(card("a"), "deck", None, ReviewStatus::New);
        store.insert_card(card("b"), "deck", None, ReviewStatus::Learned);

        let due = store.fetch_due_cards("deck", None).unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_fetch_due_excludes_future_review() {
        let mut store = MemoryProgressStore::new();
        let c = card("a");
        let id = c.id;
        store.insert_card(c, "deck", None, ReviewStatus::Learning);
        store
            .update_status(
                id,
                ReviewStatus::Learning,
                Some(Utc::now() + Duration::hours(1)),
            )
            .unwrap();

        let due = store.fetch_due_cards("deck", None).unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn test_fetch_due_scopes_to_chapter() {
        let mut store = MemoryProgressStore::new();
        store.insert_card(card("a"), "deck", Some("ch1"), ReviewStatus::New);
        store.insert_card(card("b"), "deck", Some("ch2"), ReviewStatus::New);

        let due = store.fetch_due_cards("deck", Some("ch1")).unwrap();
        assert_eq!(due.len(), 1);

        let all = store.fetch_due_cards("deck", None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_count_by_status() {
        let mut store = MemoryProgressStore::new();
        store.insert_card(card("a"), "deck", None, ReviewStatus::Learned);
        store.insert_card(card("b"), "deck", None, ReviewStatus::Learned);
        store.insert_card(card("c"), "deck", None, ReviewStatus::Learning);

        assert_eq!(
            store
                .count_by_status("deck", None, ReviewStatus::Learned)
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count_by_status("deck", None, ReviewStatus::Learning)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_favorite_store_roundtrip() {
        let mut store = MemoryFavoriteStore::new();
        let user = UserId("alice".into());
        let id = CardId::new();

        store.add(&user, id).unwrap();
        assert!(store.list(&user).unwrap().contains(&id));

        store.remove(&user, id).unwrap();
        assert!(store.list(&user).unwrap().is_empty());
    }

    #[test]
    fn test_failure_injection() {
        let mut store = MemoryProgressStore::new();
        let c = card("a");
        let id = c.id;
        store.insert_card(c, "deck", None, ReviewStatus::New);
        store.fail_updates = true;

        assert!(store
            .update_status(id, ReviewStatus::Learned, None)
            .is_err());
    }
}
