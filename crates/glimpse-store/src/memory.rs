//! In-memory reference backend
//!
//! [`MemoryStore`] implements the full [`DocumentStore`] contract: nested
//! maps behind a mutex, a strictly monotonic millisecond clock for
//! server-timestamp resolution, generated document keys, and a watcher
//! registry. Snapshot callbacks run after the internal lock is released, so
//! a callback may issue further store calls.
//!
//! [`MemoryBlobStore`] is the matching [`BlobStore`], handing out
//! `mem://`-scheme URLs.

use crate::document::{Document, Fields, WriteMode};
use crate::error::StoreError;
use crate::query::Query;
use crate::subscribe::{SnapshotCallback, Subscription};
use crate::traits::{BlobStore, DocumentStore, QuerySnapshot};
use async_trait::async_trait;
use glimpse_core::Timestamp;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Clock seed; stamps are monotonic from here, not wall time.
const CLOCK_EPOCH_MS: i64 = 1_700_000_000_000;

#[derive(Default)]
struct Inner {
    collections: BTreeMap<String, BTreeMap<String, Document>>,
    watchers: BTreeMap<u64, Watcher>,
}

struct Watcher {
    query: Query,
    callback: SnapshotCallback,
}

/// In-memory document store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    clock: Arc<AtomicI64>,
    watch_seq: Arc<AtomicU64>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            clock: Arc::new(AtomicI64::new(CLOCK_EPOCH_MS)),
            watch_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn stamp(&self) -> Timestamp {
        Timestamp(self.clock.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn validate(collection: &str, key: Option<&str>) -> Result<(), StoreError> {
        if collection.trim().is_empty() {
            return Err(StoreError::invalid_path("empty collection path"));
        }
        if let Some(key) = key {
            if key.trim().is_empty() {
                return Err(StoreError::invalid_path(format!(
                    "{collection}/<empty key>"
                )));
            }
        }
        Ok(())
    }

    fn run_query(inner: &Inner, query: &Query) -> QuerySnapshot {
        let rows = inner
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| query.matches(doc))
                    .map(|(key, doc)| (key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        query.sort_and_page(rows)
    }

    /// Snapshot every watcher of `collection` while the lock is held; the
    /// returned closures are invoked by the caller after release.
    fn pending_notifications(
        inner: &Inner,
        collection: &str,
    ) -> Vec<(SnapshotCallback, QuerySnapshot)> {
        inner
            .watchers
            .values()
            .filter(|watcher| watcher.query.collection == collection)
            .map(|watcher| {
                (
                    Arc::clone(&watcher.callback),
                    Self::run_query(inner, &watcher.query),
                )
            })
            .collect()
    }

    fn deliver(notifications: Vec<(SnapshotCallback, QuerySnapshot)>) {
        for (callback, snapshot) in notifications {
            callback(snapshot);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        Self::validate(collection, Some(key))?;
        let inner = self.inner.lock();
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| docs.contains_key(key))
            .unwrap_or(false))
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Self::validate(collection, Some(key))?;
        let inner = self.inner.lock();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        Self::validate(collection, Some(key))?;
        let now = self.stamp();
        let notifications = {
            let mut inner = self.inner.lock();
            let existing = inner
                .collections
                .get(collection)
                .and_then(|docs| docs.get(key))
                .cloned();
            let doc = fields.apply(existing.as_ref(), mode, now);
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(key.to_string(), doc);
            Self::pending_notifications(&inner, collection)
        };
        debug!(collection, key, "document written");
        Self::deliver(notifications);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        Self::validate(collection, Some(key))?;
        let notifications = {
            let mut inner = self.inner.lock();
            let removed = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(key))
                .is_some();
            if !removed {
                return Ok(());
            }
            Self::pending_notifications(&inner, collection)
        };
        debug!(collection, key, "document deleted");
        Self::deliver(notifications);
        Ok(())
    }

    async fn append(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        Self::validate(collection, None)?;
        let key = Uuid::new_v4().simple().to_string();
        let now = self.stamp();
        let notifications = {
            let mut inner = self.inner.lock();
            let doc = fields.apply(None, WriteMode::Replace, now);
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(key.clone(), doc);
            Self::pending_notifications(&inner, collection)
        };
        debug!(collection, %key, "document appended");
        Self::deliver(notifications);
        Ok(key)
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        Self::validate(collection, None)?;
        let inner = self.inner.lock();
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0))
    }

    async fn query(&self, query: Query) -> Result<QuerySnapshot, StoreError> {
        Self::validate(&query.collection, None)?;
        let inner = self.inner.lock();
        Ok(Self::run_query(&inner, &query))
    }

    async fn watch(
        &self,
        query: Query,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError> {
        Self::validate(&query.collection, None)?;
        let id = self.watch_seq.fetch_add(1, Ordering::SeqCst);
        let initial = {
            let mut inner = self.inner.lock();
            inner.watchers.insert(
                id,
                Watcher {
                    query: query.clone(),
                    callback: Arc::clone(&callback),
                },
            );
            Self::run_query(&inner, &query)
        };
        callback(initial);

        let registry = Arc::clone(&self.inner);
        Ok(Subscription::new(move || {
            registry.lock().watchers.remove(&id);
        }))
    }
}

/// In-memory blob store issuing `mem://` URLs.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// An empty blob store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        if path.trim().is_empty() {
            return Err(StoreError::invalid_path("empty blob path"));
        }
        let url = format!("mem://{path}");
        self.blobs.lock().insert(url.clone(), bytes);
        debug!(%url, "blob uploaded");
        Ok(url)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(url.to_string()))
    }
}
