//! Review engine facade.
//!
//! Composes the queue, undo history, reinsertion scheduler and favorite
//! tracker with the external stores, and exposes the operations a UI host
//! calls: session loading, swipes, explicit skips, undo, favorite
//! toggling, the scheduler tick and the end-of-session summary.
//!
//! The review flow is optimistic: the cursor always moves immediately on
//! a swipe, and status writes to the progress store are best-effort side
//! effects that never block or rewind the queue. Only the favorite toggle
//! rolls back locally on a store failure, because the favorite icon is
//! directly user-visible state.
//!
//! Every time-sensitive operation has a `*_at` form taking an explicit
//! `DateTime<Utc>`; the plain forms read the wall clock. Hosts that drive
//! their own clock (and all tests) use the `*_at` forms.

use crate::{
    CardId, FavoriteStore, FavoriteTracker, HistoryEntry, PendingReinsertion, ProgressStore,
    ReinsertionScheduler, ReviewCard, ReviewHistory, ReviewQueue, ReviewStatus, Result,
    SessionPhase, SessionStats, SkipDuration, SwipeDirection, UserId, UserSession,
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Timing knobs for the engine, all overridable via config
#[derive(Clone, Copy, Debug)]
pub struct EngineTuning {
    /// Delay before a left-swiped card is eligible to reappear in-session
    pub quick_skip: Duration,
    /// Minimum gap between accepted undos; matches the time the swipe
    /// gesture needs to animate a card back before another undo lands
    pub undo_cooldown: Duration,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            quick_skip: Duration::minutes(2),
            undo_cooldown: Duration::milliseconds(1000),
        }
    }
}

/// Orchestrator for one review session at a time
pub struct ReviewEngine<P, F> {
    progress: P,
    favorites: F,
    user: Option<UserId>,
    tuning: EngineTuning,

    deck_id: Option<String>,
    chapter_id: Option<String>,
    queue: ReviewQueue,
    history: ReviewHistory,
    scheduler: ReinsertionScheduler,
    tracker: FavoriteTracker,

    left_count: usize,
    right_count: usize,
    total_swipes: usize,
    left_counted: std::collections::HashSet<CardId>,
    last_undo_at: Option<DateTime<Utc>>,
    loaded: bool,

    rng: StdRng,
}

impl<P: ProgressStore, F: FavoriteStore> ReviewEngine<P, F> {
    pub fn new(progress: P, favorites: F, session: &dyn UserSession) -> Self {
        Self::with_tuning(progress, favorites, session, EngineTuning::default())
    }

    pub fn with_tuning(
        progress: P,
        favorites: F,
        session: &dyn UserSession,
        tuning: EngineTuning,
    ) -> Self {
        Self {
            progress,
            favorites,
            user: session.current_user(),
            tuning,
            deck_id: None,
            chapter_id: None,
            queue: ReviewQueue::default(),
            history: ReviewHistory::new(),
            scheduler: ReinsertionScheduler::new(),
            tracker: FavoriteTracker::new(),
            left_count: 0,
            right_count: 0,
            total_swipes: 0,
            left_counted: std::collections::HashSet::new(),
            last_undo_at: None,
            loaded: false,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed the internal RNG for deterministic reinsertion positions
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Fetch due cards for a deck (optionally one chapter) and start a
    /// fresh session over them.
    ///
    /// A fetch failure is fatal here: there is no sensible optimistic
    /// default for an empty session, so the error is surfaced.
    pub fn start_session(&mut self, deck_id: &str, chapter_id: Option<&str>) -> Result<usize> {
        let cards = self.progress.fetch_due_cards(deck_id, chapter_id)?;
        self.deck_id = Some(deck_id.to_string());
        self.chapter_id = chapter_id.map(|c| c.to_string());
        self.load_cards(cards);
        Ok(self.queue.len())
    }

    /// Reset all session state over an explicit card list.
    ///
    /// This is the only way to leave the Complete phase.
    pub fn load_cards(&mut self, cards: Vec<ReviewCard>) {
        tracing::info!("Loading review session with {} cards", cards.len());
        self.queue = ReviewQueue::new(cards);
        self.history.clear();
        self.scheduler.clear();
        self.left_count = 0;
        self.right_count = 0;
        self.total_swipes = 0;
        self.left_counted.clear();
        self.last_undo_at = None;
        self.loaded = true;

        // Seed the favorite tracker best-effort; an unavailable favorite
        // store must not block the review itself
        if let Some(user) = self.user.clone() {
            match self.favorites.list(&user) {
                Ok(ids) => self.tracker.replace(ids),
                Err(e) => tracing::warn!("Failed to list favorites for {}: {}", user, e),
            }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.loaded {
            SessionPhase::Loading
        } else if self.queue.is_exhausted() {
            SessionPhase::Complete
        } else {
            SessionPhase::Active
        }
    }

    pub fn is_session_complete(&self) -> bool {
        self.loaded && self.queue.is_exhausted()
    }

    // ========================================================================
    // Swipes and skips
    // ========================================================================

    /// Apply a swipe to the current card; silent no-op when the session
    /// is complete. Returns whether a card was consumed.
    pub fn swipe(&mut self, direction: SwipeDirection) -> bool {
        self.swipe_at(direction, Utc::now())
    }

    pub fn swipe_at(&mut self, direction: SwipeDirection, now: DateTime<Utc>) -> bool {
        let card = match self.queue.current() {
            Some(card) => card.clone(),
            None => return false,
        };

        match direction {
            SwipeDirection::Right => {
                self.persist_status(card.id, ReviewStatus::Learned, None);
                self.right_count += 1;
                self.push_entry(direction, card.id, false);
            }
            SwipeDirection::Left => {
                self.persist_status(
                    card.id,
                    ReviewStatus::Learning,
                    Some(now + self.tuning.quick_skip),
                );
                let counted = self.count_left(card.id);
                self.scheduler
                    .schedule(card.clone(), self.tuning.quick_skip, now);
                self.push_entry(direction, card.id, counted);
            }
        }

        self.total_swipes += 1;
        self.queue.advance();
        tracing::debug!(
            "Swiped {:?} on card {}, cursor now {}",
            direction,
            card.id,
            self.queue.cursor()
        );
        true
    }

    /// Push the current card out by an explicit menu duration.
    ///
    /// Counts and undoes like a left swipe, but schedules no in-session
    /// reinsertion: the card only returns once a future due-query picks
    /// it up.
    pub fn skip(&mut self, duration: SkipDuration) -> bool {
        self.skip_at(duration, Utc::now())
    }

    pub fn skip_at(&mut self, duration: SkipDuration, now: DateTime<Utc>) -> bool {
        let card = match self.queue.current() {
            Some(card) => card.clone(),
            None => return false,
        };

        self.persist_status(
            card.id,
            ReviewStatus::Learning,
            Some(now + duration.as_duration()),
        );
        let counted = self.count_left(card.id);
        self.push_entry(SwipeDirection::Left, card.id, counted);
        self.total_swipes += 1;
        self.queue.advance();
        tracing::debug!(
            "Skipped card {} for {} minutes",
            card.id,
            duration.minutes()
        );
        true
    }

    // ========================================================================
    // Undo
    // ========================================================================

    /// Undo the most recent swipe; silent no-op on empty history or while
    /// the cooldown is active. Returns whether an entry was undone.
    ///
    /// The status and next-review timestamp already written to the
    /// progress store by the original swipe are deliberately left in
    /// place; only the cursor and in-memory counters are restored.
    pub fn undo(&mut self) -> bool {
        self.undo_at(Utc::now())
    }

    pub fn undo_at(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_undo_at {
            if now - last < self.tuning.undo_cooldown {
                tracing::debug!("Undo rejected: cooldown active");
                return false;
            }
        }

        let entry = match self.history.pop() {
            Some(entry) => entry,
            None => return false,
        };

        self.queue.retreat_to(entry.cursor_before);
        self.total_swipes = self.total_swipes.saturating_sub(1);
        match entry.direction {
            SwipeDirection::Right => {
                self.right_count = self.right_count.saturating_sub(1);
            }
            SwipeDirection::Left => {
                if entry.counted_left {
                    self.left_counted.remove(&entry.card_id);
                    self.left_count = self.left_count.saturating_sub(1);
                }
            }
        }

        self.last_undo_at = Some(now);
        tracing::debug!(
            "Undid {:?} swipe on card {}, cursor back to {}",
            entry.direction,
            entry.card_id,
            entry.cursor_before
        );
        true
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Optimistically flip a card's favorite state, then sync the store;
    /// rolled back locally if the store write fails. Returns the final
    /// membership.
    pub fn toggle_favorite(&mut self, card_id: CardId) -> bool {
        let now_favorited = self.tracker.toggle(card_id);

        let user = match self.user.clone() {
            Some(user) => user,
            None => {
                tracing::warn!("No user session, favorite kept local only");
                return now_favorited;
            }
        };

        let result = if now_favorited {
            self.favorites.add(&user, card_id)
        } else {
            self.favorites.remove(&user, card_id)
        };

        match result {
            Ok(()) => now_favorited,
            Err(e) => {
                tracing::warn!("Favorite sync failed for card {}: {}, rolling back", card_id, e);
                self.tracker.toggle(card_id)
            }
        }
    }

    pub fn is_favorite(&self, card_id: &CardId) -> bool {
        self.tracker.contains(card_id)
    }

    // ========================================================================
    // Scheduler tick
    // ========================================================================

    /// Move due reinsertions back into the queue. Driven by a periodic
    /// timer owned by the host; once the session is complete this only
    /// discards whatever is still pending.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.scheduler.tick(now, &mut self.queue, &mut self.rng);
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    pub fn current(&self) -> Option<&ReviewCard> {
        self.queue.current()
    }

    pub fn cursor(&self) -> usize {
        self.queue.cursor()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn left_count(&self) -> usize {
        self.left_count
    }

    pub fn right_count(&self) -> usize {
        self.right_count
    }

    pub fn total_swipes(&self) -> usize {
        self.total_swipes
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn pending_reinsertions(&self) -> &[PendingReinsertion] {
        self.scheduler.pending()
    }

    pub fn progress_store(&self) -> &P {
        &self.progress
    }

    /// End-of-session summary.
    ///
    /// Learned/learning counts come from fresh store queries when those
    /// succeed; the in-memory session counters are the fallback when the
    /// store is unavailable. Total swipes is always session-local.
    pub fn session_stats(&self) -> SessionStats {
        let from_store = self.deck_id.as_deref().and_then(|deck_id| {
            let chapter = self.chapter_id.as_deref();
            let learned = self.progress.count_by_status(deck_id, chapter, ReviewStatus::Learned);
            let learning = self.progress.count_by_status(deck_id, chapter, ReviewStatus::Learning);
            match (learned, learning) {
                (Ok(learned_count), Ok(learning_count)) => Some(SessionStats {
                    learned_count,
                    learning_count,
                    total_swipes: self.total_swipes,
                }),
                (learned, learning) => {
                    if let Err(e) = learned.and(learning) {
                        tracing::warn!("Stats query failed, using session counters: {}", e);
                    }
                    None
                }
            }
        });

        from_store.unwrap_or(SessionStats {
            learned_count: self.right_count,
            learning_count: self.left_count,
            total_swipes: self.total_swipes,
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Best-effort status write; the queue has already moved on, so a
    /// store failure is logged and swallowed rather than surfaced.
    fn persist_status(
        &mut self,
        card_id: CardId,
        status: ReviewStatus,
        next_review_at: Option<DateTime<Utc>>,
    ) {
        if let Err(e) = self.progress.update_status(card_id, status, next_review_at) {
            tracing::warn!("Status write failed for card {}: {}", card_id, e);
        }
    }

    /// Increment the deduplicated left counter if this card has not been
    /// left-counted yet this session
    fn count_left(&mut self, card_id: CardId) -> bool {
        let counted = self.left_counted.insert(card_id);
        if counted {
            self.left_count += 1;
        }
        counted
    }

    fn push_entry(&mut self, direction: SwipeDirection, card_id: CardId, counted_left: bool) {
        self.history.push(HistoryEntry {
            cursor_before: self.queue.cursor(),
            direction,
            card_id,
            counted_left,
        });
    }
}
