//! TTL Cache Handle
//!
//! Thread-safe cache combining a [`CacheStore`] behind a single lock with the
//! reaper task that sweeps it.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, SweepReport};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_reaper;

// == TTL Cache ==
/// In-process key-value cache with per-entry TTL and LRU eviction.
///
/// Every operation takes the store lock for its whole duration. A reaper
/// task started at construction sweeps expired entries every
/// `sweep_interval`; it stops on [`close`](Self::close),
/// [`shutdown`](Self::shutdown), or when the cache is dropped. Reads and
/// writes keep working after the reaper stops, with expiration then
/// discovered only on read.
///
/// Share a cache between tasks by wrapping it in an `Arc`.
pub struct TtlCache<K, V> {
    store: Arc<Mutex<CacheStore<K, V>>>,
    config: CacheConfig,
    cancel: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructors ==
    /// Creates a cache and starts its reaper on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`CacheError::NoRuntime`] when called outside a runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Ok(Self::with_runtime(config, &runtime))
    }

    /// Creates a cache whose reaper runs on `runtime`.
    pub fn with_runtime(config: CacheConfig, runtime: &Handle) -> Self {
        let store = Arc::new(Mutex::new(CacheStore::new(config.max_capacity)));
        let cancel = CancellationToken::new();
        let reaper = spawn_reaper(
            Arc::downgrade(&store),
            config.sweep_interval,
            cancel.clone(),
            runtime,
        );

        info!(
            "Cache created: max_capacity={}, sweep_interval={:?}",
            config.max_capacity, config.sweep_interval
        );

        Self {
            store,
            config,
            cancel,
            reaper: Mutex::new(Some(reaper)),
        }
    }

    // == Operations ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.store.lock().set(key, value, ttl);
    }

    /// Retrieves the value for `key`.
    ///
    /// # Errors
    /// [`CacheError::KeyNotFound`] if the key is absent or expired.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.store.lock().get(key)
    }

    /// Removes `key`. Absent keys are ignored.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().delete(key);
    }

    /// Returns true if `key` is stored, without checking expiry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().contains_key(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Runs one sweep immediately, independent of the reaper schedule.
    pub fn sweep_now(&self) -> SweepReport {
        self.store.lock().sweep(&mut rand::thread_rng())
    }
}

impl<K, V> TtlCache<K, V> {
    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Alias of [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Snapshot of the activity counters.
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Lifecycle ==
    /// Signals the reaper to stop. Returns immediately.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            debug!("Closing cache, stopping reaper");
            self.cancel.cancel();
        }
    }

    /// Returns true once the reaper has been told to stop.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops the reaper and waits for it to finish.
    pub async fn shutdown(&self) {
        self.close();

        let handle = self.reaper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Reaper task ended abnormally: {}", e);
            }
        }
    }
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
