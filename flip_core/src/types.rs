//! Core domain types for the Flip review engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Cards and their opaque payloads
//! - Review status and the swipe actions that drive it
//! - The fixed skip-duration menu
//! - Session phase and end-of-session statistics

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identity Types
// ============================================================================

/// Opaque unique identifier for a card
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(Uuid);

impl CardId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CardId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identifier for the current user (favorites are per-user)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Card Types
// ============================================================================

/// A single reviewable card.
///
/// The payload (question/answer/example/image reference) is opaque JSON;
/// the engine presents and re-orders cards but never interprets their
/// content.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReviewCard {
    pub id: CardId,
    pub payload: serde_json::Value,
}

impl ReviewCard {
    pub fn new(id: CardId, payload: serde_json::Value) -> Self {
        Self { id, payload }
    }
}

/// Persisted learning status of a card.
///
/// Transitions, owned jointly by the engine and the progress store:
/// - `New | Learning` → `Learned` on a right swipe (terminal for the session)
/// - `New | Learning` → `Learning` + `next_review_at` on a left swipe or skip
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    New,
    Learning,
    Learned,
}

/// Direction of a swipe gesture
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    /// "Not yet learned" - card will come back
    Left,
    /// "Learned" - card is done for this session
    Right,
}

// ============================================================================
// Skip Menu
// ============================================================================

/// Explicit skip durations offered to the user.
///
/// Unlike a plain left swipe, these push the card out beyond the current
/// session: no in-session reinsertion is scheduled, the card only comes
/// back once a future due-query picks it up.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipDuration {
    FifteenMinutes,
    OneHour,
    OneDay,
    OneWeek,
}

impl SkipDuration {
    pub fn minutes(self) -> i64 {
        match self {
            SkipDuration::FifteenMinutes => 15,
            SkipDuration::OneHour => 60,
            SkipDuration::OneDay => 1440,
            SkipDuration::OneWeek => 10080,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Lifecycle phase of a review session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No cards loaded yet
    Loading,
    /// Cards remain to be presented
    Active,
    /// Cursor has reached the end of the queue
    Complete,
}

/// Counts shown on the end-of-session summary
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStats {
    pub learned_count: usize,
    pub learning_count: usize,
    pub total_swipes: usize,
}

/// A card pending timed re-insertion into the live queue
#[derive(Clone, Debug)]
pub struct PendingReinsertion {
    pub card: ReviewCard,
    pub due_at: DateTime<Utc>,
}
