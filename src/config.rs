//! Configuration for the pagination engine
//!
//! `PaginationConfig` is the process-wide default set at engine construction.
//! `ConfigOverrides` is its partial form, used both for `update_config` and as
//! the per-call override of `paginate`. Configs load from YAML; invalid values
//! are repaired to their defaults with a warning rather than rejected.

use crate::error::{Error, Result};
use crate::types::Strategy;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_MIN_PAGE_SIZE: usize = 1;
const DEFAULT_MAX_PAGE_SIZE: usize = 100;
const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;
const DEFAULT_MAX_CACHE_SIZE: usize = 1000;
const DEFAULT_PREFETCH_THRESHOLD: f64 = 0.8;
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_HOUSEKEEPING_INTERVAL_SECS: u64 = 60 * 60;
const MAX_MAINTENANCE_INTERVAL_SECS: u64 = 24 * 60 * 60;

// ============================================================================
// Engine Config
// ============================================================================

/// Default configuration for every pagination request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Strategy used when the caller does not override it
    #[serde(deserialize_with = "lenient_strategy")]
    pub strategy: Strategy,

    /// Page size when the request does not name one
    pub default_page_size: usize,

    /// Smallest page size a request can get
    pub min_page_size: usize,

    /// Largest page size a request can get
    pub max_page_size: usize,

    /// If non-empty, the only page sizes requests may ask for
    pub allowed_page_sizes: Vec<usize>,

    /// Sort field for offset/cursor requests that do not name one
    pub default_sort_by: Option<String>,

    /// Whether responses are cached
    pub cache_enabled: bool,

    /// Time-to-live of a cached response, in milliseconds
    pub cache_ttl_ms: u64,

    /// Maximum number of cached responses (0 disables caching)
    pub max_cache_size: usize,

    /// Whether `prefetch_next_page` does anything
    pub prefetch_enabled: bool,

    /// Fill ratio (0.0-1.0) a page needs before prefetching its successor
    pub prefetch_threshold: f64,

    /// Background cache maintenance
    pub maintenance: MaintenanceConfig,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Offset,
            default_page_size: DEFAULT_PAGE_SIZE,
            min_page_size: DEFAULT_MIN_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            allowed_page_sizes: Vec::new(),
            default_sort_by: Some("timestamp".to_string()),
            cache_enabled: true,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            prefetch_enabled: false,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl PaginationConfig {
    /// Create a config with all defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the default page size and its bounds
    #[must_use]
    pub fn with_page_sizes(mut self, default: usize, min: usize, max: usize) -> Self {
        self.default_page_size = default;
        self.min_page_size = min;
        self.max_page_size = max;
        self
    }

    /// Set cache TTL (milliseconds) and capacity
    #[must_use]
    pub fn with_cache(mut self, ttl_ms: u64, max_size: usize) -> Self {
        self.cache_enabled = true;
        self.cache_ttl_ms = ttl_ms;
        self.max_cache_size = max_size;
        self
    }

    /// Disable response caching
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Enable or disable prefetching
    #[must_use]
    pub fn with_prefetch(mut self, enabled: bool) -> Self {
        self.prefetch_enabled = enabled;
        self
    }

    /// Set the maintenance configuration
    #[must_use]
    pub fn with_maintenance(mut self, maintenance: MaintenanceConfig) -> Self {
        self.maintenance = maintenance;
        self
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Effective page size for a request
    ///
    /// Sizes outside the allow-list fall back to the default; the result is
    /// always within `[min_page_size, max_page_size]` and at least 1.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        let min = self.min_page_size.max(1);
        let max = self.max_page_size.max(min);
        let mut size = requested.unwrap_or(self.default_page_size);

        if !self.allowed_page_sizes.is_empty() && !self.allowed_page_sizes.contains(&size) {
            debug!(
                requested = size,
                fallback = self.default_page_size,
                "Page size not allowed, using default"
            );
            size = self.default_page_size;
        }

        size.clamp(min, max)
    }

    /// Report every invalid field
    pub fn validate(&self) -> Vec<Error> {
        self.clone().repair()
    }

    /// Return a copy with every invalid field reset to its default
    ///
    /// Each repair is logged at warn level.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for issue in self.repair() {
            warn!("{issue}; falling back to default");
        }
        self
    }

    fn repair(&mut self) -> Vec<Error> {
        let mut issues = Vec::new();

        if self.min_page_size == 0 {
            issues.push(Error::invalid_value("min_page_size", "must be at least 1"));
            self.min_page_size = DEFAULT_MIN_PAGE_SIZE;
        }
        if self.max_page_size == 0 {
            issues.push(Error::invalid_value("max_page_size", "must be at least 1"));
            self.max_page_size = DEFAULT_MAX_PAGE_SIZE;
        }
        if self.min_page_size > self.max_page_size {
            issues.push(Error::invalid_value(
                "min_page_size",
                format!(
                    "{} exceeds max_page_size {}",
                    self.min_page_size, self.max_page_size
                ),
            ));
            self.min_page_size = DEFAULT_MIN_PAGE_SIZE;
        }
        if !(self.min_page_size..=self.max_page_size).contains(&self.default_page_size) {
            issues.push(Error::invalid_value(
                "default_page_size",
                format!(
                    "{} is outside [{}, {}]",
                    self.default_page_size, self.min_page_size, self.max_page_size
                ),
            ));
            self.default_page_size = DEFAULT_PAGE_SIZE.clamp(self.min_page_size, self.max_page_size);
        }

        let (min, max) = (self.min_page_size, self.max_page_size);
        let before = self.allowed_page_sizes.len();
        self.allowed_page_sizes.retain(|size| (min..=max).contains(size));
        if self.allowed_page_sizes.len() != before {
            issues.push(Error::invalid_value(
                "allowed_page_sizes",
                format!("sizes outside [{min}, {max}] were dropped"),
            ));
        }

        if self.cache_ttl_ms == 0 {
            issues.push(Error::invalid_value("cache_ttl_ms", "must be positive"));
            self.cache_ttl_ms = DEFAULT_CACHE_TTL_MS;
        }
        if !(0.0..=1.0).contains(&self.prefetch_threshold) {
            issues.push(Error::invalid_value(
                "prefetch_threshold",
                format!("{} is outside [0, 1]", self.prefetch_threshold),
            ));
            self.prefetch_threshold = DEFAULT_PREFETCH_THRESHOLD;
        }

        issues.extend(self.maintenance.repair());
        issues
    }

    /// Load a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse pagination config YAML: {e}")))
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Parse a strategy name, falling back to the default on unknown names
fn lenient_strategy<'de, D>(deserializer: D) -> std::result::Result<Strategy, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|e| {
        warn!("{e}; falling back to default strategy");
        Strategy::default()
    }))
}

// ============================================================================
// Maintenance Config
// ============================================================================

/// Schedule for the background cache maintenance task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Whether the engine starts the task
    pub enabled: bool,
    /// How often expired cache entries are purged
    pub purge_interval_secs: u64,
    /// How often the housekeeping pass runs
    pub housekeeping_interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            purge_interval_secs: DEFAULT_PURGE_INTERVAL_SECS,
            housekeeping_interval_secs: DEFAULT_HOUSEKEEPING_INTERVAL_SECS,
        }
    }
}

impl MaintenanceConfig {
    /// Maintenance switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Purge interval as a duration, bounded to `[1s, 1 day]`
    pub fn purge_interval(&self) -> Duration {
        bounded_interval(self.purge_interval_secs)
    }

    /// Housekeeping interval as a duration, bounded to `[1s, 1 day]`
    pub fn housekeeping_interval(&self) -> Duration {
        bounded_interval(self.housekeeping_interval_secs)
    }

    fn repair(&mut self) -> Vec<Error> {
        let mut issues = Vec::new();
        if !valid_interval(self.purge_interval_secs) {
            issues.push(Error::invalid_value(
                "maintenance.purge_interval_secs",
                format!("must be between 1 and {MAX_MAINTENANCE_INTERVAL_SECS}"),
            ));
            self.purge_interval_secs = DEFAULT_PURGE_INTERVAL_SECS;
        }
        if !valid_interval(self.housekeeping_interval_secs) {
            issues.push(Error::invalid_value(
                "maintenance.housekeeping_interval_secs",
                format!("must be between 1 and {MAX_MAINTENANCE_INTERVAL_SECS}"),
            ));
            self.housekeeping_interval_secs = DEFAULT_HOUSEKEEPING_INTERVAL_SECS;
        }
        issues
    }
}

fn valid_interval(secs: u64) -> bool {
    (1..=MAX_MAINTENANCE_INTERVAL_SECS).contains(&secs)
}

fn bounded_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(1, MAX_MAINTENANCE_INTERVAL_SECS))
}

// ============================================================================
// Partial Config
// ============================================================================

/// Partial configuration; `None` fields keep the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_page_sizes: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cache_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<MaintenanceConfig>,
}

impl ConfigOverrides {
    /// Create an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the strategy
    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Override the default page size
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.default_page_size = Some(size);
        self
    }

    /// Override whether caching is enabled
    #[must_use]
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }

    /// Override whether prefetching is enabled
    #[must_use]
    pub fn prefetch_enabled(mut self, enabled: bool) -> Self {
        self.prefetch_enabled = Some(enabled);
        self
    }

    /// Check if nothing is overridden
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge onto a base config
    pub fn apply(&self, base: &PaginationConfig) -> PaginationConfig {
        let mut merged = base.clone();
        if let Some(strategy) = self.strategy {
            merged.strategy = strategy;
        }
        if let Some(size) = self.default_page_size {
            merged.default_page_size = size;
        }
        if let Some(size) = self.min_page_size {
            merged.min_page_size = size;
        }
        if let Some(size) = self.max_page_size {
            merged.max_page_size = size;
        }
        if let Some(sizes) = &self.allowed_page_sizes {
            merged.allowed_page_sizes.clone_from(sizes);
        }
        if let Some(field) = &self.default_sort_by {
            merged.default_sort_by = Some(field.clone());
        }
        if let Some(enabled) = self.cache_enabled {
            merged.cache_enabled = enabled;
        }
        if let Some(ttl) = self.cache_ttl_ms {
            merged.cache_ttl_ms = ttl;
        }
        if let Some(size) = self.max_cache_size {
            merged.max_cache_size = size;
        }
        if let Some(enabled) = self.prefetch_enabled {
            merged.prefetch_enabled = enabled;
        }
        if let Some(threshold) = self.prefetch_threshold {
            merged.prefetch_threshold = threshold;
        }
        if let Some(maintenance) = &self.maintenance {
            merged.maintenance = maintenance.clone();
        }
        merged
    }
}
