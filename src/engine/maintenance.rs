//! Background cache maintenance
//!
//! Two periodic passes run on one spawned task:
//! - purge: drop expired cache entries
//! - housekeeping: compact the eviction queue and refresh cache-derived
//!   metric fields
//!
//! The task stops when its handle is shut down or dropped.

use crate::cache::CacheManager;
use crate::config::MaintenanceConfig;
use crate::metrics::MetricsCollector;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to a running maintenance task
#[derive(Debug)]
pub struct MaintenanceHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl MaintenanceHandle {
    /// Spawn the maintenance loop on the current tokio runtime
    pub fn spawn(
        cache: Arc<CacheManager>,
        metrics: Arc<MetricsCollector>,
        config: &MaintenanceConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(maintenance_task(cache, metrics, config.clone(), shutdown_rx));
        Self {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Check if the task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the task to stop and wait for it
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Cache maintenance task ended abnormally");
            }
        }
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Run purge and housekeeping passes until shutdown is signalled
async fn maintenance_task(
    cache: Arc<CacheManager>,
    metrics: Arc<MetricsCollector>,
    config: MaintenanceConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let purge_period = config.purge_interval();
    let housekeeping_period = config.housekeeping_interval();

    // First ticks fire one period from now, not immediately
    let mut purge = interval_at(Instant::now() + purge_period, purge_period);
    purge.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut housekeeping = interval_at(Instant::now() + housekeeping_period, housekeeping_period);
    housekeeping.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        purge_interval_secs = config.purge_interval_secs,
        housekeeping_interval_secs = config.housekeeping_interval_secs,
        "Cache maintenance started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender also means stop
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = purge.tick() => {
                let purged = cache.purge_expired();
                debug!(purged, "Purged expired cache entries");
            }
            _ = housekeeping.tick() => {
                let compacted = cache.compact();
                let stats = cache.stats();
                metrics.refresh_cache_fields(&stats);
                debug!(compacted, size = stats.size, "Cache housekeeping pass");
            }
        }
    }

    info!("Cache maintenance stopped");
}
