//! Pagination engine module
//!
//! The façade hosts call: request in, page out.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginationEngine` - Ties source, query, paginators, cache and metrics together
//! - `MaintenanceHandle` - Background purge / housekeeping task
//!
//! A request flows: cache key → cache lookup → on a miss, fetch from the
//! record source, filter, order, slice, store → record metrics → respond.
//! Only record source failures reach the caller; malformed positional hints
//! and invalid configuration degrade inside the engine.

mod maintenance;

pub use maintenance::MaintenanceHandle;

use crate::cache::{CacheManager, CacheStatistics};
use crate::config::{ConfigOverrides, PaginationConfig};
use crate::error::Result;
use crate::metrics::{MetricsCollector, PaginationMetrics};
use crate::pagination::{paginator_for, PaginationRequest, PaginationResponse, ResponseMetadata};
use crate::query::{apply_filters, sort_entries};
use crate::source::RecordSource;
use crate::types::{Direction, Strategy};
use chrono::SecondsFormat;
use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Pagination engine over one record source
///
/// Constructed explicitly by the host and shared via `Arc`. Config sits
/// behind an async `RwLock`; cache and metrics each sit behind one short
/// mutex.
pub struct PaginationEngine {
    source: Arc<dyn RecordSource>,
    config: Arc<RwLock<PaginationConfig>>,
    cache: Arc<CacheManager>,
    metrics: Arc<MetricsCollector>,
    maintenance: Mutex<Option<MaintenanceHandle>>,
}

impl PaginationEngine {
    /// Create an engine
    ///
    /// Invalid config values fall back to their defaults with a warning. The
    /// maintenance task starts only when enabled and a tokio runtime is
    /// available.
    pub fn new(source: Arc<dyn RecordSource>, config: PaginationConfig) -> Self {
        let config = config.sanitized();
        let cache = Arc::new(CacheManager::new(config.max_cache_size));
        let metrics = Arc::new(MetricsCollector::new());
        let maintenance = start_maintenance(&cache, &metrics, &config);

        Self {
            source,
            config: Arc::new(RwLock::new(config)),
            cache,
            metrics,
            maintenance: Mutex::new(maintenance),
        }
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Fetch one page
    ///
    /// `overrides` apply to this call only. Metadata is attached when the
    /// request asks for it; its `execution_time_ms` covers the whole call.
    pub async fn paginate(
        &self,
        request: &PaginationRequest,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<PaginationResponse> {
        let started = Instant::now();
        let config = self.effective_config(overrides).await;

        let (response, cache_hit) = self.load_page(request, &config, false).await?;
        if cache_hit {
            self.metrics.record_hit();
        } else if config.cache_enabled {
            self.metrics.record_miss();
        }

        let elapsed = started.elapsed();
        self.metrics
            .record_request(config.strategy, elapsed, response.data.len());
        Ok(finish(response, elapsed, request.include_metadata))
    }

    /// Warm the cache with the page after `request`
    ///
    /// Returns `None` when prefetching is disabled or there is no next page.
    /// The returned response always carries metadata, with `prefetched` set.
    pub async fn prefetch_next_page(
        &self,
        request: &PaginationRequest,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Option<PaginationResponse>> {
        let started = Instant::now();
        let config = self.effective_config(overrides).await;
        if !config.prefetch_enabled {
            return Ok(None);
        }

        let Some(next) = self.next_request(request, &config).await? else {
            debug!(strategy = %config.strategy, "No next page to prefetch");
            return Ok(None);
        };

        let (mut response, _) = self.load_page(&next, &config, true).await?;
        self.metrics.record_prefetch();
        if let Some(metadata) = response.metadata.as_mut() {
            metadata.prefetched = true;
        }
        debug!(strategy = %config.strategy, items = response.data.len(), "Prefetched next page");
        Ok(Some(finish(response, started.elapsed(), true)))
    }

    /// Check if a response is full enough to be worth prefetching after
    pub async fn should_prefetch(
        &self,
        response: &PaginationResponse,
        overrides: Option<&ConfigOverrides>,
    ) -> bool {
        let config = self.effective_config(overrides).await;
        let page = &response.pagination;
        config.prefetch_enabled
            && page.has_next
            && response.data.len() as f64 >= config.prefetch_threshold * page.page_size as f64
    }

    /// Serve from cache, or compute and store
    ///
    /// Returns the response and whether it was a cache hit.
    async fn load_page(
        &self,
        request: &PaginationRequest,
        config: &PaginationConfig,
        prefetched: bool,
    ) -> Result<(PaginationResponse, bool)> {
        let key = config
            .cache_enabled
            .then(|| CacheManager::key(config.strategy, request, config));

        if let Some(key) = &key {
            if let Some(response) = self.cache.get(key) {
                debug!(strategy = %config.strategy, "Pagination cache hit");
                return Ok((response, true));
            }
            debug!(strategy = %config.strategy, "Pagination cache miss");
        }

        let response = self.compute_page(request, config, prefetched).await?;
        if let Some(key) = key {
            self.cache.put(key, &response, config, prefetched);
        }
        Ok((response, false))
    }

    async fn compute_page(
        &self,
        request: &PaginationRequest,
        config: &PaginationConfig,
        prefetched: bool,
    ) -> Result<PaginationResponse> {
        let paginator = paginator_for(config.strategy);
        let entries = apply_filters(self.source.entries().await?, &request.filters);

        let ordering = paginator.ordering(request, config.default_sort_by.as_deref());
        let entries = match &ordering {
            Some((field, direction)) => sort_entries(entries, field, *direction),
            None => entries,
        };

        // Cursors minted for this page carry the value of the field actually sorted on
        let effective = match (&ordering, &request.sort_by) {
            (Some((field, _)), None) => Cow::Owned(PaginationRequest {
                sort_by: Some(field.clone()),
                ..request.clone()
            }),
            _ => Cow::Borrowed(request),
        };
        let page = paginator.paginate(&entries, &effective, config.page_size(request.page_size));
        let (sort_by, sort_direction) = match ordering {
            Some((field, direction)) => (Some(field), direction),
            None => (None, request.sort_direction),
        };

        Ok(PaginationResponse {
            data: page.data,
            pagination: page.info,
            metadata: Some(ResponseMetadata {
                execution_time_ms: 0.0,
                strategy: config.strategy,
                cache_hit: false,
                prefetched,
                filters: request.filters.clone(),
                sort_by,
                sort_direction,
            }),
        })
    }

    /// Build the request for the page after `request`
    async fn next_request(
        &self,
        request: &PaginationRequest,
        config: &PaginationConfig,
    ) -> Result<Option<PaginationRequest>> {
        let mut next = request.clone();

        if config.strategy == Strategy::Offset {
            match request.offset {
                Some(offset) => {
                    let page_size = config.page_size(request.page_size);
                    let step = request.limit.map_or(page_size, |limit| limit.clamp(1, page_size));
                    next.offset = Some(offset.saturating_add(step));
                }
                None => next.page = Some(request.page.unwrap_or(1).max(1).saturating_add(1)),
            }
            return Ok(Some(next));
        }

        let (current, _) = self.load_page(request, config, false).await?;
        let info = current.pagination;
        if !info.has_next {
            return Ok(None);
        }

        next.direction = Direction::Forward;
        let anchored = match config.strategy {
            Strategy::Cursor => info.next_cursor.map(|cursor| next.cursor = Some(cursor)),
            Strategy::Time => info.next_timestamp.map(|at| {
                next.timestamp = Some(at.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            }),
            Strategy::Id => info.next_id.map(|id| next.id = Some(id)),
            Strategy::Offset => Some(()),
        };
        Ok(anchored.map(|()| next))
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Current default config
    pub async fn config(&self) -> PaginationConfig {
        self.config.read().await.clone()
    }

    /// Merge a partial config into the defaults
    ///
    /// Returns the new config. The maintenance task is restarted when its
    /// schedule changes.
    pub async fn update_config(&self, partial: &ConfigOverrides) -> PaginationConfig {
        let (updated, schedule_changed) = {
            let mut config = self.config.write().await;
            let updated = partial.apply(&config).sanitized();
            let schedule_changed = updated.maintenance != config.maintenance;
            *config = updated.clone();
            (updated, schedule_changed)
        };

        if schedule_changed {
            self.shutdown().await;
            let handle = start_maintenance(&self.cache, &self.metrics, &updated);
            *self.maintenance_slot() = handle;
        }

        info!(strategy = %updated.strategy, "Pagination config updated");
        updated
    }

    async fn effective_config(&self, overrides: Option<&ConfigOverrides>) -> PaginationConfig {
        let base = self.config().await;
        match overrides {
            Some(overrides) if !overrides.is_empty() => overrides.apply(&base).sanitized(),
            _ => base,
        }
    }

    // ========================================================================
    // Metrics & Cache
    // ========================================================================

    /// Snapshot of request metrics
    pub fn metrics(&self) -> PaginationMetrics {
        self.metrics.refresh_cache_fields(&self.cache.stats());
        self.metrics.snapshot()
    }

    /// Zero request metrics
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    /// Drop every cached page
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Pagination cache cleared");
    }

    /// Snapshot of cache counters and contents
    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.stats()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Check if the maintenance task is running
    pub fn maintenance_running(&self) -> bool {
        self.maintenance_slot()
            .as_ref()
            .is_some_and(MaintenanceHandle::is_running)
    }

    /// Stop the maintenance task
    pub async fn shutdown(&self) {
        let handle = self.maintenance_slot().take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }

    fn maintenance_slot(&self) -> std::sync::MutexGuard<'_, Option<MaintenanceHandle>> {
        self.maintenance.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn start_maintenance(
    cache: &Arc<CacheManager>,
    metrics: &Arc<MetricsCollector>,
    config: &PaginationConfig,
) -> Option<MaintenanceHandle> {
    if !config.maintenance.enabled {
        return None;
    }
    if tokio::runtime::Handle::try_current().is_err() {
        debug!("No tokio runtime, cache maintenance not started");
        return None;
    }
    Some(MaintenanceHandle::spawn(
        Arc::clone(cache),
        Arc::clone(metrics),
        &config.maintenance,
    ))
}

/// Stamp the timing, or drop the metadata if it was not requested
fn finish(
    mut response: PaginationResponse,
    elapsed: Duration,
    keep_metadata: bool,
) -> PaginationResponse {
    if keep_metadata {
        if let Some(metadata) = response.metadata.as_mut() {
            metadata.execution_time_ms = elapsed.as_secs_f64() * 1000.0;
        }
    } else {
        response.metadata = None;
    }
    response
}

#[cfg(test)]
mod tests;
