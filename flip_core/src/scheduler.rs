//! Timed re-insertion of skipped cards.
//!
//! A left swipe parks the card here with a wall-clock due time instead of
//! splicing it straight back into the queue. A coarse periodic tick (the
//! default interval is 10 seconds) moves cards whose delay has elapsed
//! back into the live queue, so a 2-minute skip really waits about two
//! minutes of real time no matter how many other cards were reviewed in
//! between.
//!
//! The scheduler itself is pure in-memory state; time is always passed in
//! explicitly and the periodic timer that drives [`tick`] lives in
//! [`crate::timer`], owned by the host with an explicit start/stop pair.
//!
//! [`tick`]: ReinsertionScheduler::tick

use crate::{PendingReinsertion, ReviewCard, ReviewQueue};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;

/// Default interval between scheduler ticks, in seconds.
///
/// Coarse enough to avoid busy-checking, fine enough that a 2-minute
/// delay is perceived as accurate to within ~10s.
pub const DEFAULT_TICK_INTERVAL_SECONDS: u64 = 10;

/// Holds cards whose in-session delay has not yet elapsed
#[derive(Clone, Debug, Default)]
pub struct ReinsertionScheduler {
    pending: Vec<PendingReinsertion>,
}

impl ReinsertionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a card until `now + delay`
    pub fn schedule(&mut self, card: ReviewCard, delay: Duration, now: DateTime<Utc>) {
        let due_at = now + delay;
        tracing::debug!("Scheduled card {} for reinsertion at {}", card.id, due_at);
        self.pending.push(PendingReinsertion { card, due_at });
    }

    /// Move every due card back into the queue; retain the rest.
    ///
    /// If the queue is already exhausted the session is over and all
    /// pending entries are discarded rather than left to accumulate.
    pub fn tick(&mut self, now: DateTime<Utc>, queue: &mut ReviewQueue, rng: &mut StdRng) {
        if self.pending.is_empty() {
            return;
        }

        if queue.is_exhausted() {
            tracing::debug!(
                "Session complete, discarding {} pending reinsertions",
                self.pending.len()
            );
            self.pending.clear();
            return;
        }

        let (due, not_due): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|entry| entry.due_at <= now);

        for entry in due {
            queue.insert_after_cursor(entry.card, rng);
        }

        self.pending = not_due;
    }

    pub fn pending(&self) -> &[PendingReinsertion] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
