#![forbid(unsafe_code)]

//! Core domain model and review logic for the Flip spaced-repetition system.
//!
//! This crate provides:
//! - Domain types (cards, statuses, swipes, skip durations)
//! - The review queue, undo history and timed reinsertion scheduler
//! - The review engine facade and autoplay driver
//! - Store abstractions with in-memory and file-backed implementations
//! - Session logging and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod queue;
pub mod history;
pub mod scheduler;
pub mod favorites;
pub mod store;
pub mod engine;
pub mod timer;
pub mod autoplay;
pub mod deck_store;
pub mod session_log;
pub mod export;
pub mod sample;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use queue::ReviewQueue;
pub use history::{HistoryEntry, ReviewHistory};
pub use scheduler::ReinsertionScheduler;
pub use favorites::FavoriteTracker;
pub use store::{
    FavoriteStore, MemoryFavoriteStore, MemoryProgressStore, ProgressStore, StaticUserSession,
    UserSession,
};
pub use engine::{EngineTuning, ReviewEngine};
pub use timer::PeriodicTicker;
pub use autoplay::{AutoplayDriver, AutoplayEvent};
pub use deck_store::{DeckEntry, DeckFile, JsonDeckStore, JsonFavoriteStore};
pub use session_log::{JsonlLog, SessionLogSink, SessionRecord};
pub use sample::{build_sample_deck, SAMPLE_DECK_ID};
