//! Collection path layout
//!
//! Per-user sets live under the user's own namespace so each side of a
//! mirrored edge is queryable independently.

use glimpse_core::UserId;

/// Top-level profile collection.
pub(crate) const USERS: &str = "users";

/// Identities `user` follows, keyed by target.
pub(crate) fn following(user: &UserId) -> String {
    format!("users/{user}/following")
}

/// Identities following `user`, keyed by source.
pub(crate) fn followers(user: &UserId) -> String {
    format!("users/{user}/followers")
}

/// `user`'s notification inbox, auto-keyed.
pub(crate) fn notifications(user: &UserId) -> String {
    format!("users/{user}/notifications")
}
