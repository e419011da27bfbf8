//! Pagination types and traits
//!
//! Defines the request/response shapes and the strategy trait shared by all
//! paginators.

use crate::source::Entry;
use crate::types::{Direction, FilterMap, SortDirection, Strategy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

/// A request for one page of entries
///
/// Each strategy reads its own positional hint (`page`/`offset`, `cursor`,
/// `timestamp` or `id`) and ignores the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationRequest {
    /// 1-based page number (offset strategy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Requested page size (clamped to the configured bounds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Explicit offset, overriding `page` (offset strategy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Number of entries to take from `offset`, at most the page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Opaque continuation token (cursor strategy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// RFC 3339 or epoch-millisecond anchor (time strategy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Entry id anchor (id strategy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Direction of travel from the anchor
    pub direction: Direction,
    /// Sort field (offset and cursor strategies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort order (offset and cursor strategies)
    pub sort_direction: SortDirection,
    /// Equality / membership filters keyed by field path
    #[serde(skip_serializing_if = "FilterMap::is_empty")]
    pub filters: FilterMap,
    /// Accepted for wire compatibility; totals are always computed
    pub include_total: bool,
    /// Attach `ResponseMetadata` to the response
    pub include_metadata: bool,
}

impl PaginationRequest {
    /// Create an empty request (first page, default ordering)
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a page number
    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Request a page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Request an explicit offset and limit
    #[must_use]
    pub fn with_offset(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = Some(offset);
        self.limit = limit;
        self
    }

    /// Continue from a cursor token
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Continue from a timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Continue from an entry id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the direction of travel
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sort by a field
    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_direction = direction;
        self
    }

    /// Add a filter
    #[must_use]
    pub fn with_filter(
        mut self,
        path: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.filters.insert(path.into(), value.into());
        self
    }

    /// Ask for response metadata
    #[must_use]
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }
}

// ============================================================================
// Response
// ============================================================================

/// Position of a page inside the filtered, ordered set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
}

impl PageInfo {
    /// Describe the window `[start, start + len)` of a set of `total` entries
    ///
    /// `current_page` is `start / page_size + 1` for every strategy.
    pub fn window(start: usize, len: usize, total: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            current_page: start / page_size + 1,
            page_size,
            total_pages: total.div_ceil(page_size),
            total_items: total,
            has_next: start + len < total,
            has_previous: start > 0 && total > 0,
            ..Default::default()
        }
    }
}

/// Diagnostic details attached when `include_metadata` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Wall time of the whole `paginate` call, in milliseconds
    pub execution_time_ms: f64,
    pub strategy: Strategy,
    pub cache_hit: bool,
    /// The page was computed by a prefetch
    pub prefetched: bool,
    pub filters: FilterMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
}

/// One page of entries plus its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub data: Vec<Entry>,
    pub pagination: PageInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

// ============================================================================
// Strategy Trait
// ============================================================================

/// Output of a paginator: the slice and where it sits
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub data: Vec<Entry>,
    pub info: PageInfo,
}

impl Page {
    /// Page over an empty set
    pub fn empty(page_size: usize) -> Self {
        Self {
            data: Vec::new(),
            info: PageInfo::window(0, 0, 0, page_size),
        }
    }

    /// Copy `entries[start..end]` into a page
    pub fn slice(entries: &[Entry], start: usize, end: usize, page_size: usize) -> Self {
        let end = end.min(entries.len());
        let start = start.min(end);
        let data = entries[start..end].to_vec();
        let info = PageInfo::window(start, data.len(), entries.len(), page_size);
        Self { data, info }
    }
}

/// Core trait for pagination strategies
///
/// Paginators receive entries that are already filtered and ordered according
/// to `ordering`, and a page size already clamped by the engine. When the
/// engine falls back to a default sort field, it is filled into
/// `request.sort_by` before `paginate` is called.
pub trait Paginator: Send + Sync {
    /// Which strategy this is
    fn strategy(&self) -> Strategy;

    /// The order entries must be in before `paginate` is called
    ///
    /// `None` keeps the source order.
    fn ordering(
        &self,
        request: &PaginationRequest,
        default_sort: Option<&str>,
    ) -> Option<(String, SortDirection)>;

    /// Cut one page out of the ordered entries
    fn paginate(&self, entries: &[Entry], request: &PaginationRequest, page_size: usize) -> Page;
}
