//! Pagination module
//!
//! Supports: Offset / page number, Cursor, Time-based, Id-based
//!
//! # Overview
//!
//! The pagination module provides a unified interface over the four ways a
//! caller can address a page of the audit trail. Each strategy receives the
//! filtered, ordered entries and cuts one page out of them, together with the
//! positional hints needed to reach the neighbouring pages.

mod strategies;
mod types;

pub use strategies::{
    paginator_for, CursorPaginator, IdBasedPaginator, OffsetPaginator, TimeBasedPaginator,
};
pub use types::{
    Page, PageInfo, PaginationRequest, PaginationResponse, Paginator, ResponseMetadata,
};
