//! User identity keys
//!
//! Identities are opaque strings issued by the external auth provider; this
//! crate never mints or destroys them. Route parameters and denormalized
//! copies sometimes arrive padded with whitespace, so construction trims.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, globally unique user key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id, trimming surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// The raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when there is no usable key ("unknown" identity).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
