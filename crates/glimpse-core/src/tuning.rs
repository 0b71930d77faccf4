//! Page-size and debounce knobs
//!
//! The query surfaces all page their results; the defaults here are the
//! values the product shipped with. Deserializable so a host application can
//! override them from its own configuration.

use serde::{Deserialize, Serialize};

/// Tunable limits shared by the service crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Result cap for the suggested-users rail.
    pub suggestion_page: usize,
    /// Result cap for name search.
    pub search_page: usize,
    /// Trailing-edge delay for search-as-you-type, in milliseconds.
    pub search_debounce_ms: u64,
    /// Result cap for the global (fallback) feed.
    pub global_feed_page: usize,
    /// Maximum number of ids accepted by the store's `in` filter.
    pub in_filter_cap: usize,
    /// Result cap for the notification dropdown.
    pub inbox_dropdown_page: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            suggestion_page: 5,
            search_page: 5,
            search_debounce_ms: 300,
            global_feed_page: 20,
            in_filter_cap: 10,
            inbox_dropdown_page: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let tuning = Tuning::default();
        assert_eq!(tuning.suggestion_page, 5);
        assert_eq!(tuning.search_page, 5);
        assert_eq!(tuning.search_debounce_ms, 300);
        assert_eq!(tuning.global_feed_page, 20);
        assert_eq!(tuning.in_filter_cap, 10);
        assert_eq!(tuning.inbox_dropdown_page, 10);
    }

    #[test]
    fn partial_overrides_keep_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{"searchPage": 8}"#).unwrap_or_default();
        // Field names are snake_case on the wire; unknown keys fall back.
        let tuning2: Tuning = serde_json::from_str(r#"{"search_page": 8}"#).unwrap();
        assert_eq!(tuning2.search_page, 8);
        assert_eq!(tuning2.global_feed_page, 20);
        assert_eq!(tuning.search_page, 5);
    }
}
