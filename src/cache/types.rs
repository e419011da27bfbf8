//! Cache entry and statistics types

use crate::pagination::{PageInfo, PaginationResponse, ResponseMetadata};
use crate::source::Entry;
use crate::types::{FilterMap, SortDirection, Strategy};
use serde::Serialize;
use std::time::{Duration, Instant};

/// One cached page plus the context it was computed under
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Vec<Entry>,
    pub pagination: PageInfo,
    pub created_at: Instant,
    pub ttl: Duration,
    pub strategy: Strategy,
    pub filters: FilterMap,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    /// Stored by a prefetch rather than a caller's request
    pub prefetched: bool,
    /// Times this entry has been served
    pub hits: u64,
}

impl CacheEntry {
    /// Check if the entry has outlived its TTL at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }

    /// Rebuild the response this entry was stored from
    ///
    /// The metadata reports a cache hit with zero execution time; the engine
    /// fills in the real timing.
    pub fn to_response(&self) -> PaginationResponse {
        PaginationResponse {
            data: self.data.clone(),
            pagination: self.pagination.clone(),
            metadata: Some(ResponseMetadata {
                execution_time_ms: 0.0,
                strategy: self.strategy,
                cache_hit: true,
                prefetched: self.prefetched,
                filters: self.filters.clone(),
                sort_by: self.sort_by.clone(),
                sort_direction: self.sort_direction,
            }),
        }
    }
}

/// Snapshot of the cache's counters and contents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatistics {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// `hits / (hits + misses)`, 0.0 before any lookup
    pub hit_rate: f64,
    pub entries: Vec<CacheEntrySummary>,
}

/// Per-entry line of `CacheStatistics`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntrySummary {
    pub key: String,
    pub strategy: Strategy,
    pub items: usize,
    pub age_ms: u64,
    pub ttl_ms: u64,
    pub hits: u64,
    pub prefetched: bool,
    pub filters_digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
}
