//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value and the instant it stops being servable.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiration instant, replaced wholesale on every set
    pub expire_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now`.
    ///
    /// A TTL too large to represent saturates to a far-future instant.
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        let expire_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| far_future(now));

        Self { value, expire_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry whose expiration instant equals `now`
    /// is already expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expire_at <= now
    }
}

/// Roughly thirty years past `now`, for TTLs that overflow `Instant`.
fn far_future(now: Instant) -> Instant {
    const THIRTY_YEARS: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);
    now.checked_add(THIRTY_YEARS).unwrap_or(now)
}
