//! Stable ordering by field

use super::field::{lookup, FieldValue};
use crate::source::Entry;
use crate::types::SortDirection;
use std::cmp::Ordering;

/// Sort entries by a (possibly nested) field
///
/// Ties keep their original relative order in both directions. Entries
/// missing the field sort first ascending, last descending.
pub fn sort_entries(mut entries: Vec<Entry>, field: &str, direction: SortDirection) -> Vec<Entry> {
    entries.sort_by(|a, b| {
        let ordering = compare_fields(lookup(a, field).as_ref(), lookup(b, field).as_ref());
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    entries
}

/// Ascending order over optional field values
pub fn compare_fields(a: Option<&FieldValue<'_>>, b: Option<&FieldValue<'_>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}
