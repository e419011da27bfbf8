//! Tests for engine module

use super::*;
use crate::config::MaintenanceConfig;
use crate::cursor::CursorCodec;
use crate::error::Error;
use crate::source::{Entry, MemorySource};
use crate::types::SortDirection;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};

fn base() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// `count` entries e01.. one minute apart; even entries are approved
fn trail(count: usize) -> Vec<Entry> {
    (1..=count)
        .map(|i| {
            let status = if i % 2 == 0 { "approved" } else { "pending" };
            Entry::new(format!("e{i:02}"), base() + ChronoDuration::minutes(i as i64))
                .with_field("status", status)
        })
        .collect()
}

fn ids(response: &PaginationResponse) -> Vec<&str> {
    response.data.iter().map(|e| e.id.as_str()).collect()
}

fn quiet_config() -> PaginationConfig {
    PaginationConfig::default().with_maintenance(MaintenanceConfig::disabled())
}

/// Memory source that counts fetches
struct CountingSource {
    inner: MemorySource,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new(entries: Vec<Entry>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemorySource::new(entries),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for CountingSource {
    async fn entries(&self) -> Result<Vec<Entry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.entries().await
    }
}

struct FailingSource;

#[async_trait]
impl RecordSource for FailingSource {
    async fn entries(&self) -> Result<Vec<Entry>> {
        Err(Error::source("connection reset"))
    }
}

fn engine_with(source: Arc<CountingSource>, config: PaginationConfig) -> PaginationEngine {
    PaginationEngine::new(source, config)
}

// ============================================================================
// Paginate Tests
// ============================================================================

#[tokio::test]
async fn test_offset_default_ordering() {
    let engine = engine_with(CountingSource::new(trail(25)), quiet_config());
    let request = PaginationRequest::new().with_page_size(10);

    let response = engine.paginate(&request, None).await.unwrap();

    assert_eq!(
        ids(&response),
        vec!["e25", "e24", "e23", "e22", "e21", "e20", "e19", "e18", "e17", "e16"]
    );
    assert_eq!(response.pagination.total_items, 25);
    assert_eq!(response.pagination.total_pages, 3);
    assert!(response.pagination.has_next);
    assert!(!response.pagination.has_previous);
    assert!(response.metadata.is_none());
}

#[tokio::test]
async fn test_default_page_size_applies() {
    let engine = engine_with(CountingSource::new(trail(25)), quiet_config());
    let response = engine.paginate(&PaginationRequest::new(), None).await.unwrap();
    assert_eq!(response.data.len(), 20);
    assert_eq!(response.pagination.page_size, 20);
}

#[tokio::test]
async fn test_repeat_request_is_cache_hit() {
    let source = CountingSource::new(trail(25));
    let engine = engine_with(Arc::clone(&source), quiet_config());
    let request = PaginationRequest::new().with_page(2).with_page_size(5).with_metadata();

    let first = engine.paginate(&request, None).await.unwrap();
    let second = engine.paginate(&request, None).await.unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(first.data, second.data);
    assert_eq!(first.pagination, second.pagination);
    assert!(!first.metadata.unwrap().cache_hit);
    let metadata = second.metadata.unwrap();
    assert!(metadata.cache_hit);
    assert!(!metadata.prefetched);

    let metrics = engine.metrics();
    assert_eq!(metrics.total_requests, 2);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.cache_misses, 1);
    assert_eq!(metrics.cache_size, 1);
}

#[tokio::test]
async fn test_metadata_describes_request() {
    let engine = engine_with(CountingSource::new(trail(10)), quiet_config());
    let request = PaginationRequest::new()
        .with_filter("status", "approved")
        .with_sort("id", SortDirection::Asc)
        .with_metadata();

    let response = engine.paginate(&request, None).await.unwrap();
    let metadata = response.metadata.as_ref().unwrap();

    assert_eq!(metadata.strategy, Strategy::Offset);
    assert_eq!(metadata.sort_by.as_deref(), Some("id"));
    assert_eq!(metadata.sort_direction, SortDirection::Asc);
    assert_eq!(metadata.filters, request.filters);
    assert!(metadata.execution_time_ms >= 0.0);
    assert_eq!(ids(&response), vec!["e02", "e04", "e06", "e08", "e10"]);
}

#[tokio::test]
async fn test_cache_disabled_override_bypasses_cache() {
    let source = CountingSource::new(trail(5));
    let engine = engine_with(Arc::clone(&source), quiet_config());
    let overrides = ConfigOverrides::new().cache_enabled(false);
    let request = PaginationRequest::new();

    engine.paginate(&request, Some(&overrides)).await.unwrap();
    engine.paginate(&request, Some(&overrides)).await.unwrap();

    assert_eq!(source.calls(), 2);
    assert_eq!(engine.cache_statistics().size, 0);
    let metrics = engine.metrics();
    assert_eq!(metrics.cache_hits, 0);
    assert_eq!(metrics.cache_misses, 0);
}

#[tokio::test]
async fn test_per_call_strategy_override() {
    let engine = engine_with(CountingSource::new(trail(10)), quiet_config());
    let overrides = ConfigOverrides::new().strategy(Strategy::Id);

    let response = engine
        .paginate(&PaginationRequest::new().with_page_size(3), Some(&overrides))
        .await
        .unwrap();

    assert_eq!(ids(&response), vec!["e01", "e02", "e03"]);
    assert_eq!(response.pagination.next_id.as_deref(), Some("e04"));
    assert_eq!(engine.config().await.strategy, Strategy::Offset);
}

#[tokio::test]
async fn test_update_config_changes_strategy() {
    let engine = engine_with(CountingSource::new(trail(10)), quiet_config());
    let request = PaginationRequest::new().with_page_size(4);

    let updated = engine
        .update_config(&ConfigOverrides::new().strategy(Strategy::Time))
        .await;
    assert_eq!(updated.strategy, Strategy::Time);

    let response = engine.paginate(&request, None).await.unwrap();
    assert_eq!(ids(&response), vec!["e10", "e09", "e08", "e07"]);
    assert_eq!(
        response.pagination.next_timestamp,
        Some(base() + ChronoDuration::minutes(7))
    );
    assert_eq!(engine.metrics().strategy_usage[&Strategy::Time], 1);
}

#[tokio::test]
async fn test_source_failure_propagates() {
    let engine = PaginationEngine::new(Arc::new(FailingSource), quiet_config());

    let err = engine
        .paginate(&PaginationRequest::new(), None)
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("connection reset"));
    assert_eq!(engine.metrics().total_requests, 0);
    assert_eq!(engine.cache_statistics().size, 0);
}

#[tokio::test]
async fn test_cached_page_ignores_new_appends_until_cleared() {
    let source = CountingSource::new(trail(3));
    let engine = engine_with(Arc::clone(&source), quiet_config());
    let request = PaginationRequest::new();

    assert_eq!(engine.paginate(&request, None).await.unwrap().data.len(), 3);
    source
        .inner
        .append(Entry::new("e04", base() + ChronoDuration::minutes(4)))
        .await;
    assert_eq!(engine.paginate(&request, None).await.unwrap().data.len(), 3);

    engine.clear_cache();
    let fresh = engine.paginate(&request, None).await.unwrap();
    assert_eq!(fresh.data.len(), 4);
    assert_eq!(fresh.data[0].id, "e04");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_expired_cache_entry_refetches() {
    let source = CountingSource::new(trail(3));
    let engine = engine_with(Arc::clone(&source), quiet_config().with_cache(20, 10));
    let request = PaginationRequest::new();

    engine.paginate(&request, None).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    engine.paginate(&request, None).await.unwrap();

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_invalid_config_is_sanitized() {
    let mut config = quiet_config();
    config.max_page_size = 0;
    config.prefetch_threshold = -1.0;

    let engine = engine_with(CountingSource::new(trail(3)), config);
    let config = engine.config().await;

    assert_eq!(config.max_page_size, 100);
    assert_eq!(config.prefetch_threshold, 0.8);
}

#[tokio::test]
async fn test_unbounded_max_page_size_with_anchors() {
    let config = quiet_config().with_page_sizes(10, 1, usize::MAX);
    let engine = engine_with(CountingSource::new(trail(10)), config);
    let request = PaginationRequest::new().with_page_size(usize::MAX);

    let cursor_first = engine
        .paginate(
            &PaginationRequest::new().with_page_size(2),
            Some(&ConfigOverrides::new().strategy(Strategy::Cursor)),
        )
        .await
        .unwrap();
    let cursor = cursor_first.pagination.next_cursor.unwrap();
    let rest = engine
        .paginate(
            &request.clone().with_cursor(cursor),
            Some(&ConfigOverrides::new().strategy(Strategy::Cursor)),
        )
        .await
        .unwrap();
    assert_eq!(rest.data.len(), 8);
    assert_eq!(rest.pagination.page_size, usize::MAX);
    assert!(!rest.pagination.has_next);

    let by_id = engine
        .paginate(
            &request.clone().with_id("e03"),
            Some(&ConfigOverrides::new().strategy(Strategy::Id)),
        )
        .await
        .unwrap();
    assert_eq!(ids(&by_id)[0], "e03");
    assert_eq!(by_id.data.len(), 8);
}

#[tokio::test]
async fn test_cursor_carries_default_sort_value() {
    let engine = engine_with(
        CountingSource::new(trail(6)),
        quiet_config().with_strategy(Strategy::Cursor),
    );

    let first = engine
        .paginate(&PaginationRequest::new().with_page_size(2), None)
        .await
        .unwrap();
    let cursor = CursorCodec::decode(&first.pagination.next_cursor.unwrap()).unwrap();

    assert_eq!(cursor.id, "e05");
    let expected = base() + ChronoDuration::minutes(5);
    assert_eq!(cursor.sort_value, Some(serde_json::Value::from(expected.to_rfc3339())));
}

#[tokio::test]
async fn test_oversized_maintenance_interval_is_repaired() {
    let mut config = PaginationConfig::default();
    config.maintenance.purge_interval_secs = u64::MAX;

    let engine = engine_with(CountingSource::new(trail(3)), config);
    tokio::task::yield_now().await;

    assert!(engine.maintenance_running());
    assert_eq!(engine.config().await.maintenance.purge_interval_secs, 300);
    engine.shutdown().await;
}

// ============================================================================
// Prefetch Tests
// ============================================================================

#[tokio::test]
async fn test_prefetch_disabled_is_noop() {
    let source = CountingSource::new(trail(10));
    let engine = engine_with(Arc::clone(&source), quiet_config());

    let prefetched = engine
        .prefetch_next_page(&PaginationRequest::new(), None)
        .await
        .unwrap();

    assert!(prefetched.is_none());
    assert_eq!(source.calls(), 0);
    assert_eq!(engine.metrics().prefetch_requests, 0);
}

#[tokio::test]
async fn test_prefetch_offset_page_is_later_a_hit() {
    let source = CountingSource::new(trail(25));
    let engine = engine_with(Arc::clone(&source), quiet_config().with_prefetch(true));
    let request = PaginationRequest::new().with_page_size(10);

    let prefetched = engine
        .prefetch_next_page(&request, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(prefetched.pagination.current_page, 2);
    assert!(prefetched.metadata.as_ref().unwrap().prefetched);

    let second = engine
        .paginate(&request.clone().with_page(2).with_metadata(), None)
        .await
        .unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(second.data, prefetched.data);
    let metadata = second.metadata.unwrap();
    assert!(metadata.cache_hit);
    assert!(metadata.prefetched);
    assert_eq!(engine.metrics().prefetch_requests, 1);
}

#[tokio::test]
async fn test_prefetch_offset_advances_explicit_offset() {
    let engine = engine_with(
        CountingSource::new(trail(25)),
        quiet_config().with_prefetch(true),
    );
    let request = PaginationRequest::new()
        .with_page_size(10)
        .with_sort("id", SortDirection::Asc)
        .with_offset(3, Some(4));

    let prefetched = engine
        .prefetch_next_page(&request, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ids(&prefetched), vec!["e08", "e09", "e10", "e11"]);
}

#[tokio::test]
async fn test_prefetch_cursor_follows_next_cursor() {
    let source = CountingSource::new(trail(12));
    let engine = engine_with(
        Arc::clone(&source),
        quiet_config().with_strategy(Strategy::Cursor).with_prefetch(true),
    );
    let request = PaginationRequest::new().with_page_size(5);

    let first = engine.paginate(&request, None).await.unwrap();
    assert_eq!(ids(&first), vec!["e12", "e11", "e10", "e09", "e08"]);

    let prefetched = engine
        .prefetch_next_page(&request, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ids(&prefetched), vec!["e07", "e06", "e05", "e04", "e03"]);

    let cursor = first.pagination.next_cursor.unwrap();
    let second = engine
        .paginate(&request.clone().with_cursor(cursor).with_metadata(), None)
        .await
        .unwrap();
    assert_eq!(second.data, prefetched.data);
    assert!(second.metadata.unwrap().prefetched);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_prefetch_id_follows_next_id() {
    let engine = engine_with(
        CountingSource::new(trail(12)),
        quiet_config().with_strategy(Strategy::Id).with_prefetch(true),
    );
    let request = PaginationRequest::new().with_page_size(5).with_id("e03");

    let prefetched = engine
        .prefetch_next_page(&request, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ids(&prefetched), vec!["e08", "e09", "e10", "e11", "e12"]);
    assert!(!prefetched.pagination.has_next);
}

#[tokio::test]
async fn test_prefetch_time_follows_next_timestamp() {
    let engine = engine_with(
        CountingSource::new(trail(12)),
        quiet_config().with_strategy(Strategy::Time).with_prefetch(true),
    );
    let request = PaginationRequest::new().with_page_size(5);

    let prefetched = engine
        .prefetch_next_page(&request, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ids(&prefetched), vec!["e07", "e06", "e05", "e04", "e03"]);
}

#[tokio::test]
async fn test_prefetch_stops_at_last_page() {
    let engine = engine_with(
        CountingSource::new(trail(4)),
        quiet_config().with_strategy(Strategy::Cursor).with_prefetch(true),
    );

    let prefetched = engine
        .prefetch_next_page(&PaginationRequest::new().with_page_size(10), None)
        .await
        .unwrap();

    assert!(prefetched.is_none());
}

#[tokio::test]
async fn test_prefetch_enabled_per_call() {
    let engine = engine_with(CountingSource::new(trail(25)), quiet_config());
    let overrides = ConfigOverrides::new().prefetch_enabled(true);

    let prefetched = engine
        .prefetch_next_page(&PaginationRequest::new(), Some(&overrides))
        .await
        .unwrap();

    assert_eq!(prefetched.unwrap().data.len(), 5);
}

#[tokio::test]
async fn test_should_prefetch_threshold() {
    let engine = engine_with(
        CountingSource::new(trail(25)),
        quiet_config().with_prefetch(true),
    );
    let request = PaginationRequest::new().with_page_size(10);

    let full = engine.paginate(&request, None).await.unwrap();
    assert!(engine.should_prefetch(&full, None).await);

    let last = engine
        .paginate(&request.clone().with_page(3), None)
        .await
        .unwrap();
    assert!(!engine.should_prefetch(&last, None).await);

    let partial = engine
        .paginate(&request.clone().with_offset(0, Some(7)), None)
        .await
        .unwrap();
    assert!(!engine.should_prefetch(&partial, None).await);

    let disabled = ConfigOverrides::new().prefetch_enabled(false);
    assert!(!engine.should_prefetch(&full, Some(&disabled)).await);
}

// ============================================================================
// Metrics / Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_reset_metrics() {
    let engine = engine_with(CountingSource::new(trail(5)), quiet_config());
    engine.paginate(&PaginationRequest::new(), None).await.unwrap();
    assert_eq!(engine.metrics().total_requests, 1);

    engine.reset_metrics();

    let metrics = engine.metrics();
    assert_eq!(metrics.total_requests, 0);
    assert_eq!(metrics.cache_size, 1);
}

#[tokio::test]
async fn test_maintenance_lifecycle() {
    let engine = engine_with(CountingSource::new(trail(3)), PaginationConfig::default());
    assert!(engine.maintenance_running());

    engine.shutdown().await;
    assert!(!engine.maintenance_running());

    engine
        .update_config(&ConfigOverrides {
            maintenance: Some(MaintenanceConfig::default()),
            ..ConfigOverrides::default()
        })
        .await;
    assert!(!engine.maintenance_running());

    engine
        .update_config(&ConfigOverrides {
            maintenance: Some(MaintenanceConfig {
                purge_interval_secs: 10,
                ..MaintenanceConfig::default()
            }),
            ..ConfigOverrides::default()
        })
        .await;
    assert!(engine.maintenance_running());

    engine
        .update_config(&ConfigOverrides {
            maintenance: Some(MaintenanceConfig::disabled()),
            ..ConfigOverrides::default()
        })
        .await;
    assert!(!engine.maintenance_running());
}

#[test]
fn test_no_runtime_no_maintenance() {
    let engine = engine_with(CountingSource::new(trail(3)), PaginationConfig::default());
    assert!(!engine.maintenance_running());
}
