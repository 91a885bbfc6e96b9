//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;
mod ttl_cache;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruList;
pub use stats::CacheStats;
pub use store::{CacheStore, SweepReport};
pub use ttl_cache::TtlCache;

// == Public Constants ==
/// Maximum number of entries inspected per sweep batch
pub const SWEEP_SAMPLE_SIZE: usize = 20;

/// Expired share of a batch at or above which the sweep takes another batch
pub const SWEEP_EXPIRED_THRESHOLD: f64 = 0.25;
