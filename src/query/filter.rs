//! Equality and set-membership filtering

use super::field::lookup;
use crate::source::Entry;
use crate::types::{FilterMap, JsonValue};

/// Keep the entries that satisfy every filter
///
/// A `null` filter value matches everything. An array filter value matches
/// when the field equals the array or is a member of it.
pub fn apply_filters(entries: Vec<Entry>, filters: &FilterMap) -> Vec<Entry> {
    let active: Vec<(&String, &JsonValue)> =
        filters.iter().filter(|(_, value)| !value.is_null()).collect();
    if active.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| {
            active
                .iter()
                .all(|(path, expected)| matches_filter(entry, path, expected))
        })
        .collect()
}

/// Check one filter against one entry
pub fn matches_filter(entry: &Entry, path: &str, expected: &JsonValue) -> bool {
    if expected.is_null() {
        return true;
    }

    let Some(value) = lookup(entry, path) else {
        return false;
    };

    if value.matches(expected) {
        return true;
    }

    match expected {
        JsonValue::Array(options) => options.iter().any(|option| value.matches(option)),
        _ => false,
    }
}
