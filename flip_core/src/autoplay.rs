//! Hands-free pacing through the queue for passive review.
//!
//! While running, the driver shows the front of the current card, waits,
//! flips to the back, waits again, swipes left on the engine, and repeats
//! until the session completes or it is stopped. Both waits are
//! cancellable, so stopping the driver (explicitly or by dropping it)
//! guarantees no swipe fires after the host screen is gone.

use crate::{CardId, FavoriteStore, ProgressStore, ReviewEngine, SwipeDirection};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default time each card face is shown, in milliseconds
pub const DEFAULT_FACE_MS: u64 = 1600;

/// Presentation steps reported to the host for rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayEvent {
    /// Front face of a card is now showing
    Reveal(CardId),
    /// Card flipped to its back face
    Flip(CardId),
    /// Card was auto-swiped left
    Swiped(CardId),
    /// Session completed, driver has stopped itself
    Finished,
}

pub struct AutoplayDriver {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AutoplayDriver {
    /// Start autoplay over a shared engine.
    ///
    /// `on_event` is invoked from the driver thread for every
    /// presentation step; the host uses it to render faces and to notice
    /// [`AutoplayEvent::Finished`].
    pub fn start<P, F, E>(
        engine: Arc<Mutex<ReviewEngine<P, F>>>,
        reveal_for: Duration,
        flip_for: Duration,
        mut on_event: E,
    ) -> Self
    where
        P: ProgressStore + Send + 'static,
        F: FavoriteStore + Send + 'static,
        E: FnMut(AutoplayEvent) + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();

        let handle = std::thread::spawn(move || loop {
            let card_id = match engine.lock() {
                Ok(engine) => engine.current().map(|card| card.id),
                Err(_) => {
                    tracing::warn!("Engine lock poisoned, stopping autoplay");
                    break;
                }
            };

            let card_id = match card_id {
                Some(id) => id,
                None => {
                    on_event(AutoplayEvent::Finished);
                    break;
                }
            };

            on_event(AutoplayEvent::Reveal(card_id));
            if wait_or_cancelled(&cancelled, reveal_for) {
                break;
            }

            on_event(AutoplayEvent::Flip(card_id));
            if wait_or_cancelled(&cancelled, flip_for) {
                break;
            }

            if let Ok(mut engine) = engine.lock() {
                engine.swipe(SwipeDirection::Left);
            }
            on_event(AutoplayEvent::Swiped(card_id));
        });

        Self {
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    /// Cancel any in-flight face wait and join the driver thread.
    ///
    /// Guarantees no further swipe once this returns.
    pub fn stop(&mut self) {
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Autoplay thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for AutoplayDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait out one face interval; true means the driver was cancelled
fn wait_or_cancelled(cancelled: &Receiver<()>, wait: Duration) -> bool {
    !matches!(cancelled.recv_timeout(wait), Err(RecvTimeoutError::Timeout))
}
