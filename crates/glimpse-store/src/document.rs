//! Documents and write sets
//!
//! A document is a flat JSON object map. Writes are described as an ordered
//! set of field operations so the store can resolve server-timestamp
//! sentinels and array transforms atomically at commit time.

use glimpse_core::Timestamp;
use serde_json::{Map, Value};

/// A stored document: field name to JSON value.
pub type Document = Map<String, Value>;

/// How a write combines with an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole document; absent fields are dropped.
    Replace,
    /// Upsert only the named fields, preserving everything else.
    Merge,
}

/// A single field operation within a write.
#[derive(Debug, Clone, PartialEq)]
enum FieldWrite {
    /// Store the value as-is.
    Set(Value),
    /// Stamp the field with the store's clock at commit time.
    ServerTimestamp,
    /// Append each value not already present, creating the array if absent.
    ArrayUnion(Vec<Value>),
    /// Remove every occurrence of each value.
    ArrayRemove(Vec<Value>),
}

/// Ordered write set, built with a chainable builder.
///
/// ```
/// use glimpse_store::Fields;
///
/// let fields = Fields::new()
///     .set("type", "follow")
///     .set("read", false)
///     .server_timestamp("createdAt");
/// assert_eq!(fields.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldWrite)>,
}

impl Fields {
    /// An empty write set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((name.into(), FieldWrite::Set(value.into())));
        self
    }

    /// Stamp `name` with the store's clock at commit time.
    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), FieldWrite::ServerTimestamp));
        self
    }

    /// Union `values` into the array at `name`, skipping values already
    /// present. A non-array or missing field becomes a fresh array.
    pub fn array_union(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.entries
            .push((name.into(), FieldWrite::ArrayUnion(values)));
        self
    }

    /// Remove every occurrence of each of `values` from the array at `name`.
    pub fn array_remove(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.entries
            .push((name.into(), FieldWrite::ArrayRemove(values)));
        self
    }

    /// Number of field operations in this write.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no field operations were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve this write against `existing`, stamping sentinels with `now`.
    ///
    /// Backends call this at commit time; the result is the full document to
    /// store. Array transforms read the merged-from base even in
    /// [`WriteMode::Replace`], where the base is empty.
    pub fn apply(&self, existing: Option<&Document>, mode: WriteMode, now: Timestamp) -> Document {
        let mut doc = match (mode, existing) {
            (WriteMode::Merge, Some(base)) => base.clone(),
            _ => Document::new(),
        };

        for (name, write) in &self.entries {
            match write {
                FieldWrite::Set(value) => {
                    doc.insert(name.clone(), value.clone());
                }
                FieldWrite::ServerTimestamp => {
                    doc.insert(name.clone(), Value::from(now.millis()));
                }
                FieldWrite::ArrayUnion(values) => {
                    let mut array = match doc.get(name) {
                        Some(Value::Array(items)) => items.clone(),
                        _ => Vec::new(),
                    };
                    for value in values {
                        if !array.contains(value) {
                            array.push(value.clone());
                        }
                    }
                    doc.insert(name.clone(), Value::Array(array));
                }
                FieldWrite::ArrayRemove(values) => {
                    let mut array = match doc.get(name) {
                        Some(Value::Array(items)) => items.clone(),
                        _ => Vec::new(),
                    };
                    array.retain(|item| !values.contains(item));
                    doc.insert(name.clone(), Value::Array(array));
                }
            }
        }

        doc
    }
}
