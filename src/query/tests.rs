//! Tests for query module

use super::*;
use crate::source::Entry;
use crate::types::{FilterMap, SortDirection};
use chrono::{DateTime, Utc};
use serde_json::json;

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn ids(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

fn sample() -> Vec<Entry> {
    vec![
        Entry::new("a", ts(300))
            .with_field("status", "approved")
            .with_field("amount", 30)
            .with_field("actor", json!({"name": "carol", "roles": ["admin"]})),
        Entry::new("b", ts(100))
            .with_field("status", "rejected")
            .with_field("amount", 10.0)
            .with_field("actor", json!({"name": "alice", "roles": ["viewer"]})),
        Entry::new("c", ts(200))
            .with_field("status", "approved")
            .with_field("amount", 20)
            .with_field("actor", json!({"name": "bob"})),
        Entry::new("d", ts(200)).with_field("status", "pending"),
    ]
}

// ============================================================================
// Field Accessor Tests
// ============================================================================

#[test]
fn test_lookup_builtin_fields() {
    let entries = sample();
    assert_eq!(lookup(&entries[0], "id"), Some(FieldValue::Text("a")));
    assert_eq!(
        lookup(&entries[0], "timestamp"),
        Some(FieldValue::Time(ts(300)))
    );
}

#[test]
fn test_lookup_nested_paths() {
    let entries = sample();
    assert_eq!(
        lookup(&entries[0], "actor.name").map(|v| v.to_json()),
        Some(json!("carol"))
    );
    assert_eq!(
        lookup(&entries[0], "actor.roles.0").map(|v| v.to_json()),
        Some(json!("admin"))
    );
    assert!(lookup(&entries[0], "actor.missing").is_none());
    assert!(lookup(&entries[0], "status.deeper").is_none());
    assert!(lookup(&entries[3], "actor.name").is_none());
    assert!(lookup(&entries[0], "actor.roles.x").is_none());
}

#[test]
fn test_field_value_matches() {
    let entries = sample();
    let amount = lookup(&entries[1], "amount").unwrap();
    assert!(amount.matches(&json!(10)));
    assert!(amount.matches(&json!(10.0)));
    assert!(!amount.matches(&json!("10")));

    let time = lookup(&entries[0], "timestamp").unwrap();
    assert!(time.matches(&json!("1970-01-01T00:05:00Z")));
    assert!(time.matches(&json!(300_000)));
    assert!(!time.matches(&json!("not a time")));
}

// ============================================================================
// Filter Tests
// ============================================================================

#[test]
fn test_filter_equality() {
    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!("approved"));

    let kept = apply_filters(sample(), &filters);
    assert_eq!(ids(&kept), vec!["a", "c"]);
}

#[test]
fn test_filter_membership() {
    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!(["approved", "pending"]));

    let kept = apply_filters(sample(), &filters);
    assert_eq!(ids(&kept), vec!["a", "c", "d"]);
}

#[test]
fn test_filter_nested_and_combined() {
    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!("approved"));
    filters.insert("actor.name".to_string(), json!("bob"));

    let kept = apply_filters(sample(), &filters);
    assert_eq!(ids(&kept), vec!["c"]);
}

#[test]
fn test_filter_null_is_noop() {
    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!(null));

    let kept = apply_filters(sample(), &filters);
    assert_eq!(kept.len(), 4);
    assert_eq!(apply_filters(sample(), &FilterMap::new()).len(), 4);
}

#[test]
fn test_filter_missing_field_never_matches() {
    let mut filters = FilterMap::new();
    filters.insert("amount".to_string(), json!(20));

    let kept = apply_filters(sample(), &filters);
    assert_eq!(ids(&kept), vec!["c"]);
}

#[test]
fn test_filter_by_id() {
    assert!(matches_filter(&sample()[1], "id", &json!("b")));
    assert!(matches_filter(&sample()[1], "id", &json!(["x", "b"])));
    assert!(!matches_filter(&sample()[1], "id", &json!("a")));
}

// ============================================================================
// Sort Tests
// ============================================================================

#[test]
fn test_sort_by_timestamp_is_stable() {
    let asc = sort_entries(sample(), "timestamp", SortDirection::Asc);
    assert_eq!(ids(&asc), vec!["b", "c", "d", "a"]);

    // c and d tie on timestamp and keep their original order
    let desc = sort_entries(sample(), "timestamp", SortDirection::Desc);
    assert_eq!(ids(&desc), vec!["a", "c", "d", "b"]);
}

#[test]
fn test_sort_mixed_number_representations() {
    let asc = sort_entries(sample(), "amount", SortDirection::Asc);
    // d has no amount and sorts first
    assert_eq!(ids(&asc), vec!["d", "b", "c", "a"]);

    let desc = sort_entries(sample(), "amount", SortDirection::Desc);
    assert_eq!(ids(&desc), vec!["a", "c", "b", "d"]);
}

#[test]
fn test_sort_nested_strings() {
    let asc = sort_entries(sample(), "actor.name", SortDirection::Asc);
    assert_eq!(ids(&asc), vec!["d", "b", "c", "a"]);
}

#[test]
fn test_sort_is_deterministic() {
    let first = sort_entries(sample(), "status", SortDirection::Asc);
    let second = sort_entries(sample(), "status", SortDirection::Asc);
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec!["a", "c", "d", "b"]);
}

#[test]
fn test_compare_across_types() {
    let null = json!(null);
    let flag = json!(true);
    let number = json!(5);
    let text = json!("x");

    let ordered = [
        FieldValue::Json(&null),
        FieldValue::Json(&flag),
        FieldValue::Json(&number),
        FieldValue::Json(&text),
    ];
    for pair in ordered.windows(2) {
        assert_eq!(pair[0].compare(&pair[1]), std::cmp::Ordering::Less);
    }

    let iso = json!("1970-01-01T00:01:40Z");
    assert_eq!(
        FieldValue::Time(ts(100)).compare(&FieldValue::Json(&iso)),
        std::cmp::Ordering::Equal
    );
    assert_eq!(
        FieldValue::Json(&iso).compare(&FieldValue::Time(ts(50))),
        std::cmp::Ordering::Greater
    );
}
