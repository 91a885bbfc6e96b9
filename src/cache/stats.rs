//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, and the three ways entries leave the
//! cache besides an explicit delete.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing cache activity since construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of failed retrievals (absent or expired)
    pub misses: u64,
    /// Entries found expired by a read and dropped
    pub expirations: u64,
    /// Entries dropped to honour the capacity bound
    pub evictions: u64,
    /// Entries reclaimed by background sweeps
    pub reaped: u64,
    /// Number of completed sweeps
    pub sweeps: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Records a successful retrieval.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Records a retrieval of an absent key.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expiration ==
    /// Records a read that found its entry expired. Counts as a miss too.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Records an entry dropped to stay within capacity.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Sweep ==
    /// Records one finished sweep and how many entries it reclaimed.
    pub fn record_sweep(&mut self, reaped: usize) {
        self.sweeps += 1;
        self.reaped += reaped as u64;
    }

    // == Set Total Entries ==
    /// Sets the current entry count reported in snapshots.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
