//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with an LRU list and TTL
//! expiration. The store itself is not synchronized; [`TtlCache`] puts it
//! behind a single lock shared with the reaper.
//!
//! [`TtlCache`]: crate::cache::TtlCache

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats, LruList, SWEEP_EXPIRED_THRESHOLD, SWEEP_SAMPLE_SIZE};
use crate::error::{CacheError, Result};

/// Arenas at or below this many slots are never compacted.
const COMPACT_MIN_SLOTS: usize = 64;

/// A list node: the key is kept next to the entry so that evicting from the
/// list side can clean up the index.
#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    entry: CacheEntry<V>,
}

// == Sweep Report ==
/// Outcome of one sampling sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Batches sampled before the expired ratio fell below threshold
    pub batches: usize,
    /// Entries inspected across all batches
    pub sampled: usize,
    /// Entries removed because they had expired
    pub reaped: usize,
}

// == Cache Store ==
/// Cache storage with LRU eviction and TTL support.
///
/// `index` and `order` always hold exactly the same key set.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key -> list handle
    index: HashMap<K, usize>,
    /// Recency order, head = least recently used
    order: LruList<Slot<K, V>>,
    /// Activity counters
    stats: CacheStats,
    /// Maximum number of entries, 0 = unbounded
    max_capacity: usize,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new store. A `max_capacity` of 0 disables capacity eviction.
    pub fn new(max_capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            order: LruList::new(),
            stats: CacheStats::new(),
            max_capacity,
        }
    }

    // == Set ==
    /// Stores a value that expires `ttl` from now.
    ///
    /// An existing entry for `key` is replaced outright: new value, new
    /// expiration, most-recently-used position. If the store then holds more
    /// than `max_capacity` entries, the least recently used one is evicted.
    pub fn set(&mut self, key: K, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    pub(crate) fn set_at(&mut self, key: K, value: V, ttl: Duration, now: Instant) {
        if let Some(idx) = self.index.remove(&key) {
            self.order.remove(idx);
        }

        let slot = Slot {
            key: key.clone(),
            entry: CacheEntry::new(value, ttl, now),
        };
        let idx = self.order.push_back(slot);
        self.index.insert(key, idx);

        if self.max_capacity > 0 && self.order.len() > self.max_capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted.key);
                self.stats.record_eviction();
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on discovery. Both absent and expired
    /// keys yield [`CacheError::KeyNotFound`]. A hit marks the entry as most
    /// recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at<Q>(&mut self, key: &Q, now: Instant) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::KeyNotFound);
        };

        let live = match self.order.get(idx) {
            Some(slot) if !slot.entry.is_expired_at(now) => Some(slot.entry.value.clone()),
            _ => None,
        };
        let Some(value) = live else {
            self.index.remove(key);
            self.order.remove(idx);
            self.stats.record_expiration();
            self.maybe_compact();
            return Err(CacheError::KeyNotFound);
        };

        self.order.move_to_back(idx);
        self.stats.record_hit();
        Ok(value)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.remove(key) {
            Some(idx) => {
                self.order.remove(idx);
                self.maybe_compact();
                true
            }
            None => false,
        }
    }

    /// Returns true if `key` is stored, expired or not. Does not touch recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter().map(|slot| &slot.key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Sweep ==
    /// Runs one sampling sweep against the current time.
    ///
    /// Samples batches of up to [`SWEEP_SAMPLE_SIZE`] entries and removes the
    /// expired ones, continuing with another batch while the expired share of
    /// the last batch is at least [`SWEEP_EXPIRED_THRESHOLD`].
    pub fn sweep<R: Rng>(&mut self, rng: &mut R) -> SweepReport {
        self.sweep_at(Instant::now(), rng)
    }

    pub(crate) fn sweep_at<R: Rng>(&mut self, now: Instant, rng: &mut R) -> SweepReport {
        let mut report = SweepReport::default();

        loop {
            let batch = self.sample(SWEEP_SAMPLE_SIZE, rng);
            if batch.is_empty() {
                break;
            }

            let mut reaped = 0;
            for &idx in &batch {
                let expired = self
                    .order
                    .get(idx)
                    .is_some_and(|slot| slot.entry.is_expired_at(now));
                if expired {
                    if let Some(slot) = self.order.remove(idx) {
                        self.index.remove(&slot.key);
                        reaped += 1;
                    }
                }
            }

            report.batches += 1;
            report.sampled += batch.len();
            report.reaped += reaped;

            if (reaped as f64) / (batch.len() as f64) < SWEEP_EXPIRED_THRESHOLD {
                break;
            }
        }

        self.stats.record_sweep(report.reaped);
        self.maybe_compact();
        report
    }

    /// Picks up to `n` distinct live handles: a run of the dense handle list
    /// starting at a random position and wrapping around.
    fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<usize> {
        let live = self.order.handles();
        if live.is_empty() {
            return Vec::new();
        }

        let start = rng.gen_range(0..live.len());
        (0..n.min(live.len()))
            .map(|offset| live[(start + offset) % live.len()])
            .collect()
    }

    /// Shrinks the arena once fewer than a quarter of its slots are live.
    fn maybe_compact(&mut self) {
        let slots = self.order.slot_count();
        if slots <= COMPACT_MIN_SLOTS || self.order.len() * 4 >= slots {
            return;
        }

        let index = &mut self.index;
        self.order.compact(|slot, idx| {
            if let Some(handle) = index.get_mut(&slot.key) {
                *handle = idx;
            }
        });
    }
}

impl<K, V> CacheStore<K, V> {
    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.order.len());
        stats
    }

    /// Configured entry bound, 0 = unbounded.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
