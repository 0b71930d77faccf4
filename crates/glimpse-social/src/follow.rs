//! Follow relationship ledger
//!
//! A follow edge exists as two mirrored documents: under the source's
//! `following` set keyed by target, and under the target's `followers` set
//! keyed by source. Both mirrors are written (and deleted) as independent
//! single-document operations, awaited strictly in order - there is no
//! cross-document transaction, so a failure between the two writes leaves a
//! half-applied edge until a later toggle or status check reconciles the
//! caller's view.
//!
//! A new follow also appends one notification to the target's inbox carrying
//! the follower's display snapshot as of the call. Unfollowing never touches
//! notifications.

use crate::error::SocialError;
use crate::paths;
use glimpse_core::{UserId, Viewer};
use glimpse_store::{DocumentStore, Fields, WriteMode};
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The edge was created; the viewer now follows the subject.
    Followed,
    /// The edge was removed.
    Unfollowed,
    /// Preconditions failed or the pair was already in flight; nothing was
    /// written. Carries the caller's unchanged state.
    Skipped {
        /// The state the caller passed in.
        following: bool,
    },
}

impl ToggleOutcome {
    /// The new (or unchanged) follow state.
    pub fn following(&self) -> bool {
        match self {
            ToggleOutcome::Followed => true,
            ToggleOutcome::Unfollowed => false,
            ToggleOutcome::Skipped { following } => *following,
        }
    }

    /// True when the call actually transitioned the edge.
    pub fn changed(&self) -> bool {
        !matches!(self, ToggleOutcome::Skipped { .. })
    }
}

/// Maintains the directed follows relation and its notification side effect.
///
/// The ledger itself holds no edge state - the store does. Its only state is
/// the re-entrancy guard: a set of `(viewer, subject)` pairs with a toggle in
/// flight. A second toggle on a held pair is a no-op, not queued; toggles on
/// distinct pairs proceed independently.
#[derive(Debug, Default)]
pub struct FollowLedger {
    in_flight: Mutex<HashSet<(UserId, UserId)>>,
}

impl FollowLedger {
    /// A ledger with no operations in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `viewer` currently follows `subject`.
    ///
    /// Missing or equal identities are "unknown": `false` without error. A
    /// failed read is logged and also yields `false` - the fail-safe default
    /// favors re-offering "Follow" over a false "Following".
    pub async fn status<S>(&self, store: &S, viewer: &UserId, subject: &UserId) -> bool
    where
        S: DocumentStore,
    {
        let subject = UserId::new(subject.as_str());
        if viewer.is_empty() || subject.is_empty() || *viewer == subject {
            return false;
        }

        match store.exists(&paths::following(viewer), subject.as_str()).await {
            Ok(exists) => exists,
            Err(error) => {
                warn!(%viewer, %subject, %error, "follow status check failed");
                false
            }
        }
    }

    /// Flip the follow edge for `(viewer.id, subject)`.
    ///
    /// `currently_following` is the caller's cached state from the last
    /// [`status`](Self::status) or toggle result; it is deliberately not
    /// re-fetched here.
    ///
    /// Follow transition: forward mirror, backward mirror, one inbox
    /// notification. Unfollow transition: delete forward, delete backward.
    /// Steps run strictly sequentially; the first failure propagates with no
    /// compensation for steps already applied.
    pub async fn toggle<S>(
        &self,
        store: &S,
        viewer: &Viewer,
        subject: &UserId,
        currently_following: bool,
    ) -> Result<ToggleOutcome, SocialError>
    where
        S: DocumentStore,
    {
        let subject = UserId::new(subject.as_str());
        if viewer.id.is_empty() || subject.is_empty() || viewer.id == subject {
            return Ok(ToggleOutcome::Skipped {
                following: currently_following,
            });
        }

        let Some(_guard) = self.acquire(&viewer.id, &subject) else {
            return Ok(ToggleOutcome::Skipped {
                following: currently_following,
            });
        };

        let result = if currently_following {
            self.unfollow(store, &viewer.id, &subject)
                .await
                .map(|()| ToggleOutcome::Unfollowed)
        } else {
            self.follow(store, viewer, &subject)
                .await
                .map(|()| ToggleOutcome::Followed)
        };

        match &result {
            Ok(outcome) => {
                debug!(viewer = %viewer.id, %subject, ?outcome, "follow toggled");
            }
            Err(error) => {
                warn!(viewer = %viewer.id, %subject, %error, "follow toggle failed");
            }
        }

        result
    }

    /// The externally observable busy flag for a pair.
    pub fn in_flight(&self, viewer: &UserId, subject: &UserId) -> bool {
        self.in_flight
            .lock()
            .contains(&(viewer.clone(), subject.clone()))
    }

    async fn follow<S>(
        &self,
        store: &S,
        viewer: &Viewer,
        subject: &UserId,
    ) -> Result<(), SocialError>
    where
        S: DocumentStore,
    {
        store
            .put(
                &paths::following(&viewer.id),
                subject.as_str(),
                Fields::new().server_timestamp("timestamp"),
                WriteMode::Replace,
            )
            .await?;
        store
            .put(
                &paths::followers(subject),
                viewer.id.as_str(),
                Fields::new().server_timestamp("timestamp"),
                WriteMode::Replace,
            )
            .await?;

        // Denormalized snapshot of the follower's display identity; later
        // profile edits do not update it.
        store
            .append(
                &paths::notifications(subject),
                Fields::new()
                    .set("type", "follow")
                    .set("fromUserId", viewer.id.as_str())
                    .set("fromUsername", viewer.display_name_or_anon())
                    .set("fromUserImage", viewer.photo_url_or_empty())
                    .set("read", false)
                    .server_timestamp("createdAt"),
            )
            .await?;

        Ok(())
    }

    async fn unfollow<S>(
        &self,
        store: &S,
        viewer: &UserId,
        subject: &UserId,
    ) -> Result<(), SocialError>
    where
        S: DocumentStore,
    {
        store
            .delete(&paths::following(viewer), subject.as_str())
            .await?;
        store
            .delete(&paths::followers(subject), viewer.as_str())
            .await?;
        Ok(())
    }

    fn acquire(&self, viewer: &UserId, subject: &UserId) -> Option<InFlightGuard<'_>> {
        let pair = (viewer.clone(), subject.clone());
        let mut held = self.in_flight.lock();
        if !held.insert(pair.clone()) {
            return None;
        }
        Some(InFlightGuard { ledger: self, pair })
    }
}

/// Releases the pair on drop, including on the error path.
struct InFlightGuard<'a> {
    ledger: &'a FollowLedger,
    pair: (UserId, UserId),
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.ledger.in_flight.lock().remove(&self.pair);
    }
}
