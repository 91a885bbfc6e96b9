//! ttlcache - An in-process key-value cache
//!
//! Entries carry their own time-to-live and are evicted least-recently-used
//! first once a capacity bound is exceeded. Expired entries are dropped when
//! a read finds them and by a background reaper that samples the store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use api::Cache;
pub use cache::{CacheStats, SweepReport, TtlCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
