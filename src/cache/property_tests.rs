//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a simple model and to verify the
//! recency, capacity, and expiration rules.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::cache::CacheStore;
use crate::error::CacheError;

// == Test Configuration ==
const LONG_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Keys from a small alphabet so that operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Reference model: a Vec in recency order, front = least recently used.
#[derive(Default)]
struct Model {
    order: Vec<(String, u32)>,
    capacity: usize,
}

impl Model {
    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn set(&mut self, key: String, value: u32) {
        if let Some(pos) = self.position(&key) {
            self.order.remove(pos);
        }
        self.order.push((key, value));
        if self.capacity > 0 && self.order.len() > self.capacity {
            self.order.remove(0);
        }
    }

    fn get(&mut self, key: &str) -> Option<u32> {
        let pos = self.position(key)?;
        let entry = self.order.remove(pos);
        let value = entry.1;
        self.order.push(entry);
        Some(value)
    }

    fn delete(&mut self, key: &str) {
        if let Some(pos) = self.position(key) {
            self.order.remove(pos);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Any operation sequence leaves the store agreeing with the model on
    // values, size, and recency order.
    #[test]
    fn prop_matches_lru_model(
        capacity in 0usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = CacheStore::new(capacity);
        let mut model = Model { capacity, ..Model::default() };

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value, LONG_TTL);
                    model.set(key, value);
                }
                CacheOp::Get { key } => {
                    let expected = model.get(&key).ok_or(CacheError::KeyNotFound);
                    prop_assert_eq!(store.get(key.as_str()), expected);
                }
                CacheOp::Delete { key } => {
                    store.delete(key.as_str());
                    model.delete(&key);
                }
            }

            prop_assert_eq!(store.len(), model.order.len());
            if capacity > 0 {
                prop_assert!(store.len() <= capacity);
            }
        }

        let store_keys: Vec<&String> = store.keys().collect();
        let model_keys: Vec<&String> = model.order.iter().map(|(k, _)| k).collect();
        prop_assert_eq!(store_keys, model_keys);
    }

    // Statistics reflect the outcome of every read.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(4);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, LONG_TTL),
                CacheOp::Get { key } => match store.get(key.as_str()) {
                    Ok(_) => expected_hits += 1,
                    Err(_) => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(key.as_str());
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // Inserting N+1 distinct keys into a store bounded at N drops exactly
    // the first one.
    #[test]
    fn prop_capacity_evicts_oldest(
        keys in prop::collection::hash_set("[a-z]{1,8}", 2..20),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len() - 1;
        let mut store = CacheStore::new(capacity);

        for (i, key) in keys.iter().enumerate() {
            store.set(key.clone(), i, LONG_TTL);
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert_eq!(store.stats().evictions, 1);
        prop_assert!(!store.contains_key(keys[0].as_str()));
        for key in keys.iter().skip(1) {
            prop_assert!(store.contains_key(key.as_str()));
        }
    }

    // A sweep never removes a live entry and removes only expired ones.
    #[test]
    fn prop_sweep_only_reaps_expired(
        entries in prop::collection::hash_map("[a-z]{1,6}", any::<bool>(), 0..120),
        seed in any::<u64>(),
    ) {
        let mut store = CacheStore::new(0);
        let now = Instant::now();
        let short = Duration::from_millis(10);

        for (key, stale) in &entries {
            let ttl = if *stale { short } else { LONG_TTL };
            store.set_at(key.clone(), (), ttl, now);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let report = store.sweep_at(now + short, &mut rng);

        let stale: HashSet<&String> = entries.iter().filter(|(_, s)| **s).map(|(k, _)| k).collect();
        let reaped: Vec<&String> = stale.iter().copied().filter(|k| !store.contains_key(k.as_str())).collect();

        prop_assert_eq!(report.reaped, reaped.len());
        prop_assert_eq!(store.len(), entries.len() - report.reaped);
        for (key, is_stale) in &entries {
            if !*is_stale {
                prop_assert!(store.contains_key(key.as_str()));
            }
        }
    }

    // When everything has expired the sweep keeps taking batches until the
    // store is empty.
    #[test]
    fn prop_sweep_drains_fully_expired_store(count in 0usize..200, seed in any::<u64>()) {
        let mut store = CacheStore::new(0);
        let now = Instant::now();

        for i in 0..count {
            store.set_at(i, i, Duration::ZERO, now);
        }

        let report = store.sweep_at(now, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(report.reaped, count);
        prop_assert!(store.is_empty());
    }

    // Overwriting replaces value and expiry and moves the key to the tail.
    #[test]
    fn prop_overwrite_semantics(
        values in prop::collection::hash_map("[a-z]{1,4}", value_strategy(), 1..10),
        new_value in value_strategy(),
    ) {
        let mut store = CacheStore::new(0);
        let now = Instant::now();
        let short = Duration::from_millis(10);

        for (key, value) in &values {
            store.set_at(key.clone(), *value, short, now);
        }
        let target = values.keys().next().cloned().unwrap_or_default();
        store.set_at(target.clone(), new_value, LONG_TTL, now);

        prop_assert_eq!(store.keys().last(), Some(&target));
        prop_assert_eq!(store.len(), values.len());
        prop_assert_eq!(store.get_at(target.as_str(), now + short), Ok(new_value));
    }
}

// == Concurrent Access ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Interleaved operations from many tasks leave the store within bounds
    // and every read returns a value that was actually written for that key.
    #[test]
    fn prop_concurrent_operation_correctness(
        ops in prop::collection::vec(cache_op_strategy(), 10..60)
    ) {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let rt = tokio::runtime::Runtime::new().unwrap();
        let written: HashMap<String, HashSet<u32>> = ops.iter().fold(HashMap::new(), |mut acc, op| {
            if let CacheOp::Set { key, value } = op {
                acc.entry(key.clone()).or_default().insert(*value);
            }
            acc
        });
        let written = Arc::new(written);

        rt.block_on(async {
            let store = Arc::new(Mutex::new(CacheStore::new(8)));
            let mut handles = vec![];

            for op in ops {
                let store = Arc::clone(&store);
                let written = Arc::clone(&written);
                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { key, value } => {
                            store.lock().set(key, value, LONG_TTL);
                            Ok(())
                        }
                        CacheOp::Get { key } => {
                            let result = store.lock().get(key.as_str());
                            match result {
                                Ok(value) if !written.get(&key).is_some_and(|vs| vs.contains(&value)) => {
                                    Err(format!("read {value} for '{key}' which was never written"))
                                }
                                _ => Ok(()),
                            }
                        }
                        CacheOp::Delete { key } => {
                            store.lock().delete(key.as_str());
                            Ok(())
                        }
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("task should not panic");
                prop_assert!(result.is_ok(), "{:?}", result);
            }

            prop_assert!(store.lock().len() <= 8);
            Ok(())
        })?;
    }
}
