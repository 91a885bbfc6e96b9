//! Cache Contract
//!
//! The caller-facing interface: a cache maps keys to values that stay
//! readable until their TTL lapses or they are evicted.

use std::hash::Hash;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::error::Result;

/// Key-value cache with per-entry time-to-live.
pub trait Cache<K, V> {
    /// Returns the value for `key`, or [`CacheError::KeyNotFound`] if it was
    /// never set, has been removed, or has expired.
    ///
    /// [`CacheError::KeyNotFound`]: crate::error::CacheError::KeyNotFound
    fn get(&self, key: &K) -> Result<V>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    fn set(&self, key: K, value: V, ttl: Duration);

    /// Removes `key` if present.
    fn del(&self, key: &K);
}

impl<K, V> Cache<K, V> for TtlCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn get(&self, key: &K) -> Result<V> {
        TtlCache::get(self, key)
    }

    fn set(&self, key: K, value: V, ttl: Duration) {
        TtlCache::set(self, key, value, ttl)
    }

    fn del(&self, key: &K) {
        self.delete(key)
    }
}
