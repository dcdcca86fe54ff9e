//! Ordered working set of cards for one review pass.
//!
//! The queue holds the cards of the current session plus a cursor. Cards
//! below the cursor are resolved for this pass (learned, or waiting on a
//! timed re-insertion); cards at or above it are yet to be presented.
//! Skipped cards re-enter the tail at a random slot so they do not
//! reappear in a predictable position.

use crate::ReviewCard;
use rand::rngs::StdRng;
use rand::Rng;

/// Mutable card sequence plus presentation cursor.
///
/// Invariant: `0 <= cursor <= cards.len()`.
#[derive(Clone, Debug, Default)]
pub struct ReviewQueue {
    cards: Vec<ReviewCard>,
    cursor: usize,
}

impl ReviewQueue {
    pub fn new(cards: Vec<ReviewCard>) -> Self {
        Self { cards, cursor: 0 }
    }

    /// Card at the cursor, or `None` once the pass is complete
    pub fn current(&self) -> Option<&ReviewCard> {
        self.cards.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once every card has been presented
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.cards.len()
    }

    /// Move past the current card
    pub fn advance(&mut self) {
        if self.cursor < self.cards.len() {
            self.cursor += 1;
        }
    }

    /// Step the cursor back by one; no-op at the front
    pub fn retreat(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Restore the cursor to a previously recorded position.
    ///
    /// Undo records the cursor it saw before a swipe and restores exactly
    /// that, rather than blindly decrementing, so it stays correct even if
    /// re-insertions grew the tail in between. Forward moves are refused.
    pub fn retreat_to(&mut self, cursor_before: usize) {
        if cursor_before <= self.cursor {
            self.cursor = cursor_before;
        } else {
            tracing::warn!(
                "Refusing to retreat forward: cursor {} -> {}",
                self.cursor,
                cursor_before
            );
        }
    }

    /// Insert a returning card at a uniformly random slot strictly after
    /// the cursor (the very end included).
    ///
    /// The randomization keeps a reinserted card from predictably showing
    /// up immediately or at a fixed distance, approximating interleaved
    /// practice. If the cursor has already passed the end, the session is
    /// over and the insertion is dropped.
    pub fn insert_after_cursor(&mut self, card: ReviewCard, rng: &mut StdRng) {
        if self.is_exhausted() {
            tracing::debug!("Queue exhausted, dropping insertion of card {}", card.id);
            return;
        }

        let tail_slots = self.cards.len() - self.cursor;
        let index = self.cursor + 1 + rng.random_range(0..tail_slots);
        tracing::debug!("Reinserting card {} at index {}", card.id, index);
        self.cards.insert(index, card);
    }

    /// Append a card at the end of the queue
    pub fn push_back(&mut self, card: ReviewCard) {
        self.cards.push(card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CardId;
    use rand::SeedableRng;

    fn card(label: &str) -> ReviewCard {
        ReviewCard::new(CardId::new(), serde_json::json!({ "front": label }))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_current_and_advance() {
        let a = card("a");
        let b = card("b");
        let mut queue = ReviewQueue::new(vec![a.clone(), b.clone()]);

        assert_eq!(queue.current(), Some(&a));
        queue.advance();
        assert_eq!(queue.current(), Some(&b));
        queue.advance();
        assert_eq!(queue.current(), None);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut queue = ReviewQueue::new(vec![card("a")]);
        queue.advance();
        queue.advance();
        assert_eq!(queue.cursor(), 1);
    }

    #[test]
    fn test_retreat_is_noop_at_front() {
        let mut queue = ReviewQueue::new(vec![card("a")]);
        queue.retreat();
        assert_eq!(queue.cursor(), 0);
    }

    #[test]
    fn test_retreat_to_refuses_forward_moves() {
        let mut queue = ReviewQueue::new(vec![card("a"), card("b")]);
        queue.advance();
        queue.retreat_to(2);
        assert_eq!(queue.cursor(), 1);
        queue.retreat_to(0);
        assert_eq!(queue.cursor(), 0);
    }

    #[test]
    fn test_insert_lands_strictly_after_cursor() {
        let mut rng = rng();
        for _ in 0..50 {
            let current = card("current");
            let mut queue =
                ReviewQueue::new(vec![current.clone(), card("b"), card("c"), card("d")]);
            let returning = card("returning");
            let returning_id = returning.id;

            queue.insert_after_cursor(returning, &mut rng);

            assert_eq!(queue.len(), 5);
            // The presented card must not move
            assert_eq!(queue.current(), Some(&current));
            // And the new card must sit somewhere in the tail
            let pos = queue
                .cards
                .iter()
                .position(|c| c.id == returning_id)
                .expect("inserted card missing");
            assert!(pos > queue.cursor());
        }
    }

    #[test]
    fn test_insert_dropped_when_exhausted() {
        let mut rng = rng();
        let mut queue = ReviewQueue::new(vec![card("a")]);
        queue.advance();
        assert!(queue.is_exhausted());

        queue.insert_after_cursor(card("late"), &mut rng);
        assert_eq!(queue.len(), 1);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_insert_with_single_remaining_card_goes_to_end() {
        let mut rng = rng();
        let mut queue = ReviewQueue::new(vec![card("last")]);
        let returning = card("returning");
        let returning_id = returning.id;

        // Only one legal slot: directly after the card being presented
        queue.insert_after_cursor(returning, &mut rng);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.cards[1].id, returning_id);
    }

    #[test]
    fn test_push_back_appends() {
        let mut queue = ReviewQueue::new(vec![card("a")]);
        let extra = card("extra");
        let id = extra.id;
        queue.push_back(extra);
        assert_eq!(queue.cards.last().map(|c| c.id), Some(id));
    }
}
