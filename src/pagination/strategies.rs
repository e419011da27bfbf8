//! Pagination strategy implementations
//!
//! Each strategy handles a specific way of addressing a page. None of them
//! fail: malformed or stale positional hints restart from the beginning of
//! the set, and out-of-range positions are clamped.

use super::types::{Page, PaginationRequest, Paginator};
use crate::cursor::CursorCodec;
use crate::query::parse_time;
use crate::source::Entry;
use crate::types::{Direction, SortDirection, Strategy};
use tracing::debug;

/// Paginator for a strategy
pub fn paginator_for(strategy: Strategy) -> &'static dyn Paginator {
    match strategy {
        Strategy::Offset => &OffsetPaginator,
        Strategy::Cursor => &CursorPaginator,
        Strategy::Time => &TimeBasedPaginator,
        Strategy::Id => &IdBasedPaginator,
    }
}

/// Request sort field, falling back to the configured default
fn requested_ordering(
    request: &PaginationRequest,
    default_sort: Option<&str>,
) -> Option<(String, SortDirection)> {
    request
        .sort_by
        .as_deref()
        .or(default_sort)
        .map(|field| (field.to_string(), request.sort_direction))
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// `offset = request.offset ?? (page - 1) * page_size`, taking `limit`
/// entries (at most one page) from there.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetPaginator;

impl Paginator for OffsetPaginator {
    fn strategy(&self) -> Strategy {
        Strategy::Offset
    }

    fn ordering(
        &self,
        request: &PaginationRequest,
        default_sort: Option<&str>,
    ) -> Option<(String, SortDirection)> {
        requested_ordering(request, default_sort)
    }

    fn paginate(&self, entries: &[Entry], request: &PaginationRequest, page_size: usize) -> Page {
        let page_size = page_size.max(1);
        let limit = request.limit.unwrap_or(page_size).clamp(1, page_size);
        let page = request.page.unwrap_or(1).max(1);
        let offset = request
            .offset
            .unwrap_or_else(|| (page - 1).saturating_mul(page_size));

        let mut result = Page::slice(entries, offset, offset.saturating_add(limit), page_size);
        result.info.current_page = match request.offset {
            Some(offset) => (offset / page_size).saturating_add(1),
            None => page,
        };
        result
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination
///
/// Forward pages start right after the cursor entry; backward pages end right
/// before it. `next_cursor` points at the last item of the page and
/// `previous_cursor` at the first, so following either one walks to the
/// adjacent page whichever direction the current page was reached from.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorPaginator;

impl Paginator for CursorPaginator {
    fn strategy(&self) -> Strategy {
        Strategy::Cursor
    }

    fn ordering(
        &self,
        request: &PaginationRequest,
        default_sort: Option<&str>,
    ) -> Option<(String, SortDirection)> {
        requested_ordering(request, default_sort)
    }

    fn paginate(&self, entries: &[Entry], request: &PaginationRequest, page_size: usize) -> Page {
        if entries.is_empty() {
            return Page::empty(page_size);
        }
        let page_size = page_size.max(1);
        let last = entries.len() - 1;

        let anchor = match request.cursor.as_deref().map(CursorCodec::decode) {
            Some(Ok(cursor)) => {
                let found = entries.iter().position(|e| e.id == cursor.id);
                if found.is_none() {
                    debug!(id = %cursor.id, "Cursor entry not in result set, starting from the beginning");
                }
                found
            }
            Some(Err(e)) => {
                debug!(error = %e, "Ignoring malformed cursor");
                None
            }
            None => None,
        };

        let (start, end) = match (anchor, request.direction) {
            (Some(index), Direction::Forward) => {
                let start = (index + 1).min(last);
                (start, start.saturating_add(page_size))
            }
            (Some(index), Direction::Backward) => (index.saturating_sub(page_size), index),
            (None, _) => (0, page_size),
        };

        let mut result = Page::slice(entries, start, end, page_size);
        let sort_by = request.sort_by.as_deref();
        if result.info.has_next {
            result.info.next_cursor = result
                .data
                .last()
                .map(|e| CursorCodec::encode(e, Direction::Forward, sort_by));
        }
        if result.info.has_previous {
            result.info.previous_cursor = result
                .data
                .first()
                .map(|e| CursorCodec::encode(e, Direction::Backward, sort_by));
        }
        result
    }
}

// ============================================================================
// Time-Based Pagination
// ============================================================================

/// Time-based pagination over entries ordered newest first
///
/// Forward pages hold the entries strictly older than `request.timestamp`;
/// backward pages hold the entries immediately newer than it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBasedPaginator;

impl Paginator for TimeBasedPaginator {
    fn strategy(&self) -> Strategy {
        Strategy::Time
    }

    fn ordering(
        &self,
        _request: &PaginationRequest,
        _default_sort: Option<&str>,
    ) -> Option<(String, SortDirection)> {
        Some(("timestamp".to_string(), SortDirection::Desc))
    }

    fn paginate(&self, entries: &[Entry], request: &PaginationRequest, page_size: usize) -> Page {
        if entries.is_empty() {
            return Page::empty(page_size);
        }
        let page_size = page_size.max(1);

        let anchor = request.timestamp.as_deref().and_then(|raw| {
            let parsed = parse_time(raw);
            if parsed.is_none() {
                debug!(timestamp = raw, "Ignoring malformed timestamp");
            }
            parsed
        });

        let (start, end) = match (anchor, request.direction) {
            (Some(at), Direction::Forward) => {
                let start = entries.partition_point(|e| e.timestamp >= at);
                (start, start.saturating_add(page_size))
            }
            (Some(at), Direction::Backward) => {
                let newer = entries.partition_point(|e| e.timestamp > at);
                (newer.saturating_sub(page_size), newer)
            }
            (None, _) => (0, page_size),
        };

        let mut result = Page::slice(entries, start, end, page_size);
        if result.info.has_next {
            result.info.next_timestamp = result.data.last().map(|e| e.timestamp);
        }
        if result.info.has_previous {
            result.info.previous_timestamp = result.data.first().map(|e| e.timestamp);
        }
        result
    }
}

// ============================================================================
// Id-Based Pagination
// ============================================================================

/// Id-based pagination over entries ordered by ascending id
///
/// Forward pages start at `request.id`; backward pages end just before it.
/// `next_id` is the first id after the page and `previous_id` the first id
/// of the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdBasedPaginator;

impl Paginator for IdBasedPaginator {
    fn strategy(&self) -> Strategy {
        Strategy::Id
    }

    fn ordering(
        &self,
        _request: &PaginationRequest,
        _default_sort: Option<&str>,
    ) -> Option<(String, SortDirection)> {
        Some(("id".to_string(), SortDirection::Asc))
    }

    fn paginate(&self, entries: &[Entry], request: &PaginationRequest, page_size: usize) -> Page {
        if entries.is_empty() {
            return Page::empty(page_size);
        }
        let page_size = page_size.max(1);

        let anchor = request.id.as_deref().and_then(|id| {
            let found = entries
                .binary_search_by(|e| e.id.as_str().cmp(id))
                .ok();
            if found.is_none() {
                debug!(id, "Id not in result set, starting from the beginning");
            }
            found
        });

        let (start, end) = match (anchor, request.direction) {
            (Some(index), Direction::Forward) => (index, index.saturating_add(page_size)),
            (Some(index), Direction::Backward) => (index.saturating_sub(page_size), index),
            (None, _) => (0, page_size),
        };

        let mut result = Page::slice(entries, start, end, page_size);
        let end = start.min(entries.len()) + result.data.len();
        if result.info.has_next {
            result.info.next_id = entries.get(end).map(|e| e.id.clone());
        }
        if result.info.has_previous {
            result.info.previous_id = result.data.first().map(|e| e.id.clone());
        }
        result
    }
}
