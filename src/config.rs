//! Configuration Module
//!
//! Construction-time settings for a cache instance, loaded from environment
//! variables or built up with setters.

use std::env;
use std::time::Duration;

/// Default reaper cadence.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest cadence the reaper accepts.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Cache configuration parameters.
///
/// Immutable once a cache has been built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries, 0 = unbounded
    pub max_capacity: usize,
    /// Interval between background sweeps
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TTLCACHE_MAX_CAPACITY` - Maximum entries, 0 = unbounded (default: 0)
    /// - `TTLCACHE_SWEEP_INTERVAL_MS` - Reaper cadence in milliseconds (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_capacity = env::var("TTLCACHE_MAX_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_capacity);
        let sweep_interval = env::var("TTLCACHE_SWEEP_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.sweep_interval);

        Self::default()
            .with_max_capacity(max_capacity)
            .with_sweep_interval(sweep_interval)
    }

    /// Sets the entry bound. 0 disables capacity eviction.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Sets the reaper cadence. Values below 1ms are clamped up.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval.max(MIN_SWEEP_INTERVAL);
        self
    }

    /// Returns true when capacity eviction is enabled.
    pub fn is_bounded(&self) -> bool {
        self.max_capacity > 0
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 0,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
