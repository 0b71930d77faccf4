//! Trailing-edge debouncer
//!
//! Search-as-you-type fires a query only after the user pauses; every new
//! keystroke cancels the pending one. The submitted action runs on a spawned
//! task after the delay, so `submit` must be called from within a tokio
//! runtime.

use glimpse_core::Tuning;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs the most recently submitted action after a quiet period.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// A debouncer with an explicit delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// A debouncer with the configured search delay.
    pub fn for_search(tuning: &Tuning) -> Self {
        Self::new(Duration::from_millis(tuning.search_debounce_ms))
    }

    /// Schedule `action` after the delay, aborting any pending submission.
    pub fn submit<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action().await;
        });

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    /// Abort the pending submission, if any.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
