//! Result cache module
//!
//! Stores computed pages so repeated requests skip the source fetch, filter,
//! sort and slice steps.
//!
//! # Overview
//!
//! The cache module provides:
//! - `CacheManager` - Keyed page store with TTL expiry and FIFO eviction
//! - `CacheEntry` - One cached page plus the context it was computed under
//! - `CacheStatistics` - Counters and per-entry summaries
//!
//! # Example
//!
//! ```ignore
//! use trailpager::cache::CacheManager;
//!
//! let cache = CacheManager::new(config.max_cache_size);
//! let key = CacheManager::key(config.strategy, &request, &config);
//! if let Some(page) = cache.get(&key) {
//!     return Ok(page);
//! }
//! ```

mod manager;
mod types;

pub use manager::CacheManager;
pub use types::{CacheEntry, CacheEntrySummary, CacheStatistics};
