//! Glimpse Social - Relationships, profiles, and notifications
//!
//! The heart of this crate is the [`FollowLedger`]: the directed "follows"
//! relation between user identities, stored as two mirrored edge documents
//! plus a notification fan-out on each new follow. The ledger preserves the
//! backend's write model faithfully - independent per-document writes with
//! no cross-document transaction, guarded client-side by a per-pair
//! re-entrancy lock.
//!
//! Around it sit the profile documents ([`ProfileService`]) and the
//! notification inbox ([`NotificationService`]), both thin query layers over
//! the same store.
//!
//! Services are stateless and take the store per call, so one instance can
//! serve any number of viewers.

pub mod error;
pub mod follow;
pub mod notification;
pub mod profile;

pub(crate) mod paths;

pub use error::SocialError;
pub use follow::{FollowLedger, ToggleOutcome};
pub use notification::{Notification, NotificationKind, NotificationService};
pub use profile::{Profile, ProfileChanges, ProfileService};
