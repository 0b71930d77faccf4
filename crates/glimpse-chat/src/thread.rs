//! Canonical thread identifiers
//!
//! A thread id is derived, never allocated: the two participant keys in
//! lexicographic order, joined with `_`. Whoever initiates, the pair maps to
//! the same id, which is what makes the thread upsert idempotent.

use glimpse_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the single thread shared by an unordered identity pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Derive the canonical id for a pair.
    ///
    /// Returns `None` for self-pairs and blank ids - there is no thread with
    /// yourself, and an unknown participant has no stable key.
    pub fn for_pair(a: &UserId, b: &UserId) -> Option<Self> {
        let a = UserId::new(a.as_str());
        let b = UserId::new(b.as_str());
        if a.is_empty() || b.is_empty() || a == b {
            return None;
        }
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Some(Self(format!("{low}_{high}")))
    }

    /// Wrap an id previously derived by [`for_pair`](Self::for_pair), e.g.
    /// one arriving in a route parameter.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
