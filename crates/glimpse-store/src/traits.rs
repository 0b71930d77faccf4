//! Store trait contracts
//!
//! Service crates are generic over these traits and never name a concrete
//! backend. All I/O is async; within one logical operation callers await
//! each step before issuing the next, so there is no concurrent dispatch of
//! related writes - only a failure-ordering question, which the services own.

use crate::document::{Document, Fields, WriteMode};
use crate::error::StoreError;
use crate::query::Query;
use crate::subscribe::{SnapshotCallback, Subscription};
use async_trait::async_trait;

/// A query result set: `(document key, document)` pairs.
pub type QuerySnapshot = Vec<(String, Document)>;

/// Key-value document storage with compound-filter queries and live watches.
///
/// Writes are atomic per individual document only; there are no
/// cross-document transactions. `delete` of an absent key is not an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup: does `collection/key` exist?
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    /// Fetch a single document, `None` when absent.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Upsert `collection/key`. [`WriteMode::Merge`] preserves fields not
    /// named in `fields`; [`WriteMode::Replace`] drops them.
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Delete `collection/key`. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Insert under a generated key and return it.
    async fn append(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Number of documents in `collection`.
    async fn count(&self, collection: &str) -> Result<usize, StoreError>;

    /// Run a one-shot query.
    async fn query(&self, query: Query) -> Result<QuerySnapshot, StoreError>;

    /// Watch a query: the callback receives the full current result set
    /// immediately and after every committed write to the collection.
    async fn watch(
        &self,
        query: Query,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError>;
}

/// Opaque binary storage returning a retrievable URL per upload.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return the URL to fetch them by.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    /// Retrieve previously uploaded bytes by URL.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError>;
}
