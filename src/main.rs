//! ttlcache-bench - Throughput harness for the TTL cache
//!
//! Measures Set, Get, and Set+Del against a cache pre-filled with 500
//! entries and bounded at 1000, then prints a JSON report.
//!
//! # Environment Variables
//! - `TTLCACHE_BENCH_OPS` - Operations per phase (default: 100000)
//! - `TTLCACHE_SWEEP_INTERVAL_MS` - Reaper cadence (default: 5000)
//! - `RUST_LOG` - Log filter (default: `ttlcache=info`)

use std::env;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttlcache::{CacheConfig, CacheStats, TtlCache};

const BENCH_CAPACITY: usize = 1000;
const PREFILL: usize = 500;
const DEFAULT_OPS: usize = 100_000;

/// Timing for one measured phase.
#[derive(Debug, Serialize)]
struct PhaseResult {
    name: &'static str,
    ops: usize,
    total_ms: f64,
    ns_per_op: f64,
}

impl PhaseResult {
    fn new(name: &'static str, ops: usize, elapsed: Duration) -> Self {
        let ns_per_op = if ops == 0 {
            0.0
        } else {
            elapsed.as_nanos() as f64 / ops as f64
        };
        Self {
            name,
            ops,
            total_ms: elapsed.as_secs_f64() * 1000.0,
            ns_per_op,
        }
    }
}

#[derive(Debug, Serialize)]
struct BenchReport {
    started_at: DateTime<Utc>,
    max_capacity: usize,
    phases: Vec<PhaseResult>,
    stats: CacheStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlcache=info,ttlcache_bench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ops = match env::var("TTLCACHE_BENCH_OPS") {
        Ok(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid TTLCACHE_BENCH_OPS: {raw}"))?,
        Err(_) => DEFAULT_OPS,
    };
    let config = CacheConfig::from_env().with_max_capacity(BENCH_CAPACITY);
    let started_at = Utc::now();

    info!("Running benchmark: ops={}, config={:?}", ops, config);

    let mut phases = Vec::new();

    // Set: fresh keys against a half-full cache
    let cache = prefilled(&config, "key_base_", Duration::from_millis(500))?;
    let start = Instant::now();
    for n in 0..ops {
        cache.set(format!("key_{n}"), format!("val_{n}"), Duration::from_millis(500));
    }
    phases.push(PhaseResult::new("set", ops, start.elapsed()));
    cache.shutdown().await;

    // Get: cycling over live prefilled keys
    let cache = prefilled(&config, "key_", Duration::from_secs(500))?;
    let start = Instant::now();
    for n in 0..ops {
        let _ = cache.get(format!("key_{}", n % PREFILL).as_str());
    }
    phases.push(PhaseResult::new("get", ops, start.elapsed()));
    let get_stats = cache.stats();
    cache.shutdown().await;

    // Set followed by Del
    let cache = prefilled(&config, "key_base_", Duration::from_millis(500))?;
    let start = Instant::now();
    for n in 0..ops {
        let key = format!("key_{n}");
        cache.set(key.clone(), format!("val_{n}"), Duration::from_millis(500));
        cache.delete(key.as_str());
    }
    phases.push(PhaseResult::new("set_del", ops, start.elapsed()));
    cache.shutdown().await;

    for phase in &phases {
        info!("{}: {:.1} ns/op", phase.name, phase.ns_per_op);
    }

    let report = BenchReport {
        started_at,
        max_capacity: BENCH_CAPACITY,
        phases,
        stats: get_stats,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Builds a cache holding `PREFILL` entries named `{prefix}{i}`.
fn prefilled(
    config: &CacheConfig,
    prefix: &str,
    ttl: Duration,
) -> anyhow::Result<TtlCache<String, String>> {
    let cache = TtlCache::new(config.clone()).context("failed to create cache")?;
    for i in 0..PREFILL {
        cache.set(format!("{prefix}{i}"), format!("val_base_{i}"), ttl);
    }
    Ok(cache)
}
