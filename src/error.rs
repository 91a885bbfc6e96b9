//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// Key was never set, was deleted or evicted, or its TTL has lapsed
    #[error("key not found")]
    KeyNotFound,

    /// The cache was constructed outside a tokio runtime, so the reaper
    /// task had nowhere to run
    #[error("no tokio runtime available to run the reaper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
