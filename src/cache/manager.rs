//! Cache manager implementation
//!
//! A TTL + FIFO cache of computed pages. Map and insertion queue share one
//! mutex; no critical section awaits.

use super::types::{CacheEntry, CacheEntrySummary, CacheStatistics};
use crate::config::PaginationConfig;
use crate::pagination::{PaginationRequest, PaginationResponse};
use crate::types::{FilterMap, SortDirection, Strategy};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn};

/// Hex length of the filter digest shown in summaries
const FILTER_DIGEST_LEN: usize = 16;

/// The parts of the config that change which page a request yields
#[derive(Serialize)]
struct KeyMaterial<'a> {
    strategy: Strategy,
    request: &'a PaginationRequest,
    default_page_size: usize,
    min_page_size: usize,
    max_page_size: usize,
    allowed_page_sizes: &'a [usize],
    default_sort_by: Option<&'a str>,
}

struct Slot {
    seq: u64,
    entry: CacheEntry,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Slot>,
    /// Insertion order; slots whose sequence no longer matches are stale
    order: VecDeque<(u64, String)>,
    next_seq: u64,
    max_size: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheState {
    fn is_live(&self, seq: u64, key: &str) -> bool {
        self.entries.get(key).is_some_and(|slot| slot.seq == seq)
    }

    fn compact(&mut self) -> usize {
        let before = self.order.len();
        let entries = &self.entries;
        self.order
            .retain(|(seq, key)| entries.get(key).is_some_and(|slot| slot.seq == *seq));
        before - self.order.len()
    }

    fn evict_oldest(&mut self) -> bool {
        while let Some((seq, key)) = self.order.pop_front() {
            if self.is_live(seq, &key) {
                self.entries.remove(&key);
                self.evictions += 1;
                debug!(key = %key, "Evicted oldest cache entry");
                return true;
            }
        }
        false
    }
}

/// Cache of computed pages keyed by request fingerprint
pub struct CacheManager {
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("CacheManager")
            .field("size", &stats.size)
            .field("max_size", &stats.max_size)
            .finish()
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(PaginationConfig::default().max_cache_size)
    }
}

impl CacheManager {
    /// Create an empty cache holding at most `max_size` pages
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                max_size,
                ..CacheState::default()
            }),
        }
    }

    /// Fingerprint of a request under a strategy and config
    ///
    /// Hex SHA-256 of the JSON form of the inputs. Filters are an ordered map,
    /// so equal requests always produce equal keys. Flags that only shape the
    /// response envelope are left out.
    pub fn key(strategy: Strategy, request: &PaginationRequest, config: &PaginationConfig) -> String {
        let mut request = request.clone();
        request.include_metadata = false;
        request.include_total = false;

        let material = KeyMaterial {
            strategy,
            request: &request,
            default_page_size: config.default_page_size,
            min_page_size: config.min_page_size,
            max_page_size: config.max_page_size,
            allowed_page_sizes: &config.allowed_page_sizes,
            default_sort_by: config.default_sort_by.as_deref(),
        };
        sha256_hex(&serde_json::to_vec(&material).unwrap_or_default())
    }

    /// Look up a page, expiring it if its TTL has passed
    pub fn get(&self, key: &str) -> Option<PaginationResponse> {
        let now = Instant::now();
        let mut guard = self.lock();
        let state = &mut *guard;

        match state.entries.get(key).map(|slot| slot.entry.is_expired(now)) {
            Some(false) => {
                state.hits += 1;
                state.entries.get_mut(key).map(|slot| {
                    slot.entry.hits += 1;
                    slot.entry.to_response()
                })
            }
            Some(true) => {
                debug!(key, "Cache entry expired");
                state.entries.remove(key);
                state.misses += 1;
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Store a page
    ///
    /// Evicts the oldest entries while the cache is at capacity. Nothing is
    /// stored when `config.max_cache_size` is 0.
    pub fn put(
        &self,
        key: impl Into<String>,
        response: &PaginationResponse,
        config: &PaginationConfig,
        prefetched: bool,
    ) {
        let key = key.into();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.max_size = config.max_cache_size;

        state.entries.remove(&key);
        if state.max_size == 0 {
            return;
        }
        while state.entries.len() >= state.max_size {
            if !state.evict_oldest() {
                break;
            }
        }

        let (strategy, filters, sort_by, sort_direction) = match &response.metadata {
            Some(meta) => (
                meta.strategy,
                meta.filters.clone(),
                meta.sort_by.clone(),
                meta.sort_direction,
            ),
            None => (
                config.strategy,
                FilterMap::new(),
                None,
                SortDirection::default(),
            ),
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.push_back((seq, key.clone()));
        state.entries.insert(
            key,
            Slot {
                seq,
                entry: CacheEntry {
                    data: response.data.clone(),
                    pagination: response.pagination.clone(),
                    created_at: Instant::now(),
                    ttl: config.cache_ttl(),
                    strategy,
                    filters,
                    sort_by,
                    sort_direction,
                    prefetched,
                    hits: 0,
                },
            },
        );

        // Re-inserted keys leave stale slots behind
        if state.order.len() > state.entries.len() * 2 + 16 {
            state.compact();
        }
    }

    /// Remove one entry; returns whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Remove every entry, keeping the counters
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|_, slot| !slot.entry.is_expired(now));
        let purged = before - state.entries.len();
        if purged > 0 {
            state.compact();
        }
        purged
    }

    /// Drop stale slots from the insertion queue; returns how many were dropped
    pub fn compact(&self) -> usize {
        self.lock().compact()
    }

    /// Number of cached pages
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot counters and entry summaries
    ///
    /// Entries are listed oldest first.
    pub fn stats(&self) -> CacheStatistics {
        let now = Instant::now();
        let state = self.lock();
        let lookups = state.hits + state.misses;

        let entries = state
            .order
            .iter()
            .filter_map(|(seq, key)| {
                let slot = state.entries.get(key).filter(|slot| slot.seq == *seq)?;
                let entry = &slot.entry;
                Some(CacheEntrySummary {
                    key: key.clone(),
                    strategy: entry.strategy,
                    items: entry.data.len(),
                    age_ms: now.saturating_duration_since(entry.created_at).as_millis() as u64,
                    ttl_ms: entry.ttl.as_millis() as u64,
                    hits: entry.hits,
                    prefetched: entry.prefetched,
                    filters_digest: filters_digest(&entry.filters),
                    sort_by: entry.sort_by.clone(),
                    sort_direction: entry.sort_direction,
                })
            })
            .collect();

        CacheStatistics {
            size: state.entries.len(),
            max_size: state.max_size,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                state.hits as f64 / lookups as f64
            },
            entries,
        }
    }

    /// Acquire the state, wiping it if a previous holder panicked
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Cache state corrupted by a panicked holder, clearing cache");
                let mut guard = poisoned.into_inner();
                guard.entries.clear();
                guard.order.clear();
                self.state.clear_poison();
                guard
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.state.lock();
            panic!("poisoning cache lock");
        }));
    }
}

fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

fn filters_digest(filters: &FilterMap) -> String {
    let mut digest = sha256_hex(&serde_json::to_vec(filters).unwrap_or_default());
    digest.truncate(FILTER_DIGEST_LEN);
    digest
}
