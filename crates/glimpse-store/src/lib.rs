//! Glimpse Store - External backend contract
//!
//! The hosted backend the application delegates to is modeled here as a pair
//! of traits plus an in-memory reference implementation:
//!
//! - [`DocumentStore`] - key-value document storage with compound-filter
//!   queries, ordering, merge-writes, server timestamps, and array
//!   transforms. Writes are atomic per document, never across documents.
//! - [`BlobStore`] - opaque binary storage returning a retrievable URL.
//! - [`Subscription`] - live query watches delivering the full current
//!   result set on every committed write, cancellable by handle.
//!
//! [`MemoryStore`] implements the whole surface and backs every test in the
//! workspace. Service crates stay generic over the traits so a real backend
//! can be substituted without touching them.

pub mod document;
pub mod error;
pub mod memory;
pub mod query;
pub mod subscribe;
pub mod traits;

pub use document::{Document, Fields, WriteMode};
pub use error::StoreError;
pub use memory::{MemoryBlobStore, MemoryStore};
pub use query::{Direction, Filter, Query};
pub use subscribe::{SnapshotCallback, Subscription};
pub use traits::{BlobStore, DocumentStore, QuerySnapshot};
