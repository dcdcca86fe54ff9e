//! Periodic timer with explicit start/stop ownership.
//!
//! Drives the reinsertion scheduler's coarse tick. Lifetime is a
//! first-class contract: the thread is spawned by [`PeriodicTicker::start`]
//! and is guaranteed to be gone after [`PeriodicTicker::stop`] (or Drop)
//! returns, so a torn-down host can never have a stale tick mutating a
//! discarded queue.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

pub struct PeriodicTicker {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTicker {
    /// Spawn a thread invoking `on_tick` every `interval` until stopped
    pub fn start<T>(interval: Duration, mut on_tick: T) -> Self
    where
        T: FnMut() + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel();
        let handle = std::thread::spawn(move || loop {
            match cancelled.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => on_tick(),
                // Explicit stop or the sender dropped with the ticker
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    /// Cancel the timer and wait for the thread to exit.
    ///
    /// No tick callback runs after this returns.
    pub fn stop(&mut self) {
        // Dropping the sender wakes the thread out of recv_timeout
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Ticker thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for PeriodicTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
