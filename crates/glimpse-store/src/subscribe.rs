//! Live query subscriptions
//!
//! The backend's real-time mechanism is modeled as: subscribe with a query
//! and a callback, receive the full current result set immediately and again
//! after every committed write to the watched collection. Snapshots, never
//! deltas. The handle cancels the watch explicitly or on drop; a cancelled
//! watch delivers nothing further.

use crate::document::Document;
use std::sync::Arc;

/// Callback invoked with the full current result set.
pub type SnapshotCallback = Arc<dyn Fn(Vec<(String, Document)>) + Send + Sync>;

/// Handle to an active watch.
///
/// Dropping the handle cancels the watch, so a subscriber that goes away
/// mid-operation stops observing updates without any correctness impact on
/// the store.
pub struct Subscription {
    canceller: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a backend-specific cancellation closure.
    pub fn new(canceller: impl FnOnce() + Send + 'static) -> Self {
        Self {
            canceller: Some(Box::new(canceller)),
        }
    }

    /// Stop the watch. Idempotent; also runs on drop.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.canceller.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cancel_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        {
            let _sub = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
