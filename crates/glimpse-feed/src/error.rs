//! Feed error types

use glimpse_store::StoreError;
use thiserror::Error;

/// Errors from post, comment, and feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A store read or write failed.
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

    /// A post was submitted without a photo.
    #[error("a post requires an image")]
    MissingImage,
}

impl FeedError {
    pub(crate) fn decode(what: &'static str, key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            what,
            key: key.into(),
            source,
        }
    }
}
