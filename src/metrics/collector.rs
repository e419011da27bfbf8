//! Metrics collector implementation

use crate::cache::CacheStatistics;
use crate::types::Strategy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Snapshot of the engine's request counters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetrics {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// `cache_hits / (cache_hits + cache_misses)`, 0.0 before any lookup
    pub cache_hit_rate: f64,
    pub average_response_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastest_response_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slowest_response_ms: Option<f64>,
    pub average_page_size: f64,
    pub strategy_usage: BTreeMap<Strategy, u64>,
    pub prefetch_requests: u64,
    /// Cache size as of the last housekeeping pass or `metrics()` call
    pub cache_size: usize,
    pub last_reset: DateTime<Utc>,
}

impl PaginationMetrics {
    fn new() -> Self {
        Self {
            total_requests: 0,
            cache_hits: 0,
            cache_misses: 0,
            cache_hit_rate: 0.0,
            average_response_time_ms: 0.0,
            fastest_response_ms: None,
            slowest_response_ms: None,
            average_page_size: 0.0,
            strategy_usage: BTreeMap::new(),
            prefetch_requests: 0,
            cache_size: 0,
            last_reset: Utc::now(),
        }
    }

    fn refresh_hit_rate(&mut self) {
        let lookups = self.cache_hits + self.cache_misses;
        self.cache_hit_rate = if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        };
    }
}

impl Default for PaginationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe metrics recorder
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: Mutex<PaginationMetrics>,
}

impl MetricsCollector {
    /// Create a collector with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit
    pub fn record_hit(&self) {
        let mut metrics = self.lock();
        metrics.cache_hits += 1;
        metrics.refresh_hit_rate();
    }

    /// Record a cache miss
    pub fn record_miss(&self) {
        let mut metrics = self.lock();
        metrics.cache_misses += 1;
        metrics.refresh_hit_rate();
    }

    /// Record a completed request
    pub fn record_request(&self, strategy: Strategy, elapsed: Duration, page_len: usize) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let mut metrics = self.lock();

        metrics.total_requests += 1;
        let n = metrics.total_requests as f64;
        metrics.average_response_time_ms += (elapsed_ms - metrics.average_response_time_ms) / n;
        metrics.average_page_size += (page_len as f64 - metrics.average_page_size) / n;
        metrics.fastest_response_ms = Some(
            metrics
                .fastest_response_ms
                .map_or(elapsed_ms, |fastest| fastest.min(elapsed_ms)),
        );
        metrics.slowest_response_ms = Some(
            metrics
                .slowest_response_ms
                .map_or(elapsed_ms, |slowest| slowest.max(elapsed_ms)),
        );
        *metrics.strategy_usage.entry(strategy).or_insert(0) += 1;
    }

    /// Record a prefetch
    pub fn record_prefetch(&self) {
        self.lock().prefetch_requests += 1;
    }

    /// Copy cache-derived fields from fresh cache statistics
    pub fn refresh_cache_fields(&self, stats: &CacheStatistics) {
        self.lock().cache_size = stats.size;
    }

    /// Current counters
    pub fn snapshot(&self) -> PaginationMetrics {
        self.lock().clone()
    }

    /// Zero every counter and stamp `last_reset`
    pub fn reset(&self) {
        *self.lock() = PaginationMetrics::new();
    }

    fn lock(&self) -> MutexGuard<'_, PaginationMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
