//! Social error types

use glimpse_store::StoreError;
use thiserror::Error;

/// Errors from follow, profile, and notification operations.
#[derive(Debug, Error)]
pub enum SocialError {
    /// A store read or write failed mid-operation. For multi-step writes the
    /// preceding steps are not rolled back; the caller's cached state stays
    /// at its last-known value.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// A stored document did not match the expected shape.
    #[error("malformed {what} document {key}: {source}")]
    Decode {
        /// Which model failed to decode.
        what: &'static str,
        /// The offending document key.
        key: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl SocialError {
    pub(crate) fn decode(what: &'static str, key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            what,
            key: key.into(),
            source,
        }
    }
}
