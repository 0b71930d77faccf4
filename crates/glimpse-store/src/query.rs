//! Compound-filter queries
//!
//! The filter vocabulary matches what the backend offers: equality,
//! inequality, range bounds (used for prefix search), array membership, and
//! id-set membership. Evaluation lives here so every backend agrees on the
//! semantics; the in-memory store and the tests both call [`Query::matches`]
//! and [`Query::sort_and_page`].

use crate::document::Document;
use serde_json::Value;
use std::cmp::Ordering;

/// A single predicate on a document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field exists and equals the value.
    Eq(String, Value),
    /// Field exists and differs from the value.
    NotEq(String, Value),
    /// Field exists and is `>=` the value.
    Gte(String, Value),
    /// Field exists and is `<=` the value.
    Lte(String, Value),
    /// Field is an array containing the value.
    ArrayContains(String, Value),
    /// Field exists and equals one of the values.
    In(String, Vec<Value>),
}

/// Sort direction for an ordered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest value first.
    Asc,
    /// Largest value first.
    Desc,
}

/// A query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// `/`-joined collection path, e.g. `users/u2/followers`.
    pub collection: String,
    /// Conjunction of field predicates.
    pub filters: Vec<Filter>,
    /// Optional ordering; documents missing the field are excluded.
    pub order_by: Option<(String, Direction)>,
    /// Optional result cap, applied after ordering.
    pub limit: Option<usize>,
}

impl Query {
    /// All documents in `collection`, unordered and unlimited.
    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            collection: path.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Add a filter predicate.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order results by `field`.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `doc` satisfies every filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(field, value) => doc.get(field) == Some(value),
            Filter::NotEq(field, value) => {
                doc.get(field).map(|found| found != value).unwrap_or(false)
            }
            Filter::Gte(field, value) => doc
                .get(field)
                .and_then(|found| compare_values(found, value))
                .map(|ord| ord != Ordering::Less)
                .unwrap_or(false),
            Filter::Lte(field, value) => doc
                .get(field)
                .and_then(|found| compare_values(found, value))
                .map(|ord| ord != Ordering::Greater)
                .unwrap_or(false),
            Filter::ArrayContains(field, value) => match doc.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
            Filter::In(field, values) => doc
                .get(field)
                .map(|found| values.contains(found))
                .unwrap_or(false),
        })
    }

    /// Order and page a filtered result set.
    ///
    /// When an ordering field is set, documents missing it are dropped (the
    /// backend does the same). Ties break on the document key so results are
    /// deterministic.
    pub fn sort_and_page(&self, mut rows: Vec<(String, Document)>) -> Vec<(String, Document)> {
        if let Some((field, direction)) = &self.order_by {
            rows.retain(|(_, doc)| doc.contains_key(field));
            rows.sort_by(|(key_a, doc_a), (key_b, doc_b)| {
                let ord = match (doc_a.get(field), doc_b.get(field)) {
                    (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                let ord = match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                };
                ord.then_with(|| key_a.cmp(key_b))
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        rows
    }
}

/// Compare two JSON values of the same kind; `None` for mixed kinds.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
