// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Trailpager
//!
//! Pagination and result caching over an append-only audit trail.
//!
//! ## Features
//!
//! - **Four Strategies**: Offset / page number, opaque cursor, timestamp, entry id
//! - **Filtering & Sorting**: Dotted-path equality and set-membership filters, stable sorts
//! - **Result Cache**: SHA-256 request keys, TTL expiry, FIFO eviction
//! - **Prefetching**: Warm the cache with the next page before it is asked for
//! - **Metrics**: Hit rates, response times, page sizes, per-strategy usage
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trailpager::{MemorySource, PaginationConfig, PaginationEngine, PaginationRequest, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = Arc::new(MemorySource::new(entries));
//!     let engine = PaginationEngine::new(source, PaginationConfig::default());
//!
//!     let request = PaginationRequest::new()
//!         .with_page_size(25)
//!         .with_filter("status", "approved");
//!     let page = engine.paginate(&request, None).await?;
//!
//!     println!("{} of {} entries", page.data.len(), page.pagination.total_items);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       PaginationEngine                          │
//! │  paginate(request) → Page    prefetch_next_page(request)        │
//! │  config / update_config      metrics / cache_statistics         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────┬───────┴───────┬────────────┬────────────┐
//! │  Source   │  Query   │   Paginate    │   Cache    │  Metrics   │
//! ├───────────┼──────────┼───────────────┼────────────┼────────────┤
//! │ Memory    │ Filter   │ Offset        │ SHA-256    │ Hit rate   │
//! │ JSON file │ Sort     │ Cursor        │ TTL        │ Timing     │
//! │ JSON Lines│ Dot path │ Time-based    │ FIFO       │ Usage      │
//! │           │          │ Id-based      │ Maintenance│            │
//! └───────────┴──────────┴───────────────┴────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for trailpager
pub mod error;

/// Common types and type aliases
pub mod types;

/// Audit entries and record sources
pub mod source;

/// Field lookup, filtering and sorting
pub mod query;

/// Opaque cursor tokens
pub mod cursor;

/// Pagination strategies
pub mod pagination;

/// Result cache
pub mod cache;

/// Request metrics
pub mod metrics;

/// Engine configuration
pub mod config;

/// Pagination engine and background maintenance
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{ConfigOverrides, MaintenanceConfig, PaginationConfig};
pub use engine::PaginationEngine;
pub use pagination::{PageInfo, PaginationRequest, PaginationResponse};
pub use source::{Entry, JsonFileSource, MemorySource, RecordSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
