//! Store error types

use thiserror::Error;

/// Errors surfaced by document and blob store operations.
///
/// Every failure here is transient from the application's point of view:
/// callers log, alert, and leave local state at its last-known value. Nothing
/// is retried by the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A collection path or document key was empty or malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// No blob is stored under the given URL.
    #[error("blob not found: {0}")]
    BlobNotFound(String),
}

impl StoreError {
    /// Convenience constructor for backend failures.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Convenience constructor for path validation failures.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }
}
