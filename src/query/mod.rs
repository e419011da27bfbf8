//! Query module
//!
//! Filtering and ordering applied to the raw entry list before pagination.
//!
//! # Overview
//!
//! The query module provides:
//! - `lookup` / `FieldValue` - Dotted-path field accessor over an `Entry`
//! - `apply_filters` - Equality / set-membership filtering
//! - `sort_entries` - Stable ordering by a named field
//!
//! Both filtering and sorting are pure and deterministic; the cache relies on
//! identical inputs producing identical pages.

mod field;
mod filter;
mod sort;

pub use field::{lookup, FieldValue};
pub(crate) use field::parse_time;
pub use filter::{apply_filters, matches_filter};
pub use sort::{compare_fields, sort_entries};

#[cfg(test)]
mod tests;
