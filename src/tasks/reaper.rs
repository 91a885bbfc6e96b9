//! Expired Entry Reaper
//!
//! Background task that periodically runs a sampling sweep over a cache
//! store, reclaiming expired entries that no read has discovered yet.

use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns the reaper for `store` on `runtime`.
///
/// The task sleeps for `interval`, locks the store, sweeps, then sleeps
/// again, so the next sweep starts `interval` after the previous one ends.
/// It holds only a weak reference to the store.
///
/// # Arguments
/// * `store` - Weak reference to the shared store
/// * `interval` - Pause between the end of one sweep and the start of the next
/// * `cancel` - Token that stops the task
/// * `runtime` - Runtime to spawn on
///
/// # Returns
/// A JoinHandle for the spawned task. The task finishes when `cancel` fires
/// or when the last strong reference to the store is gone.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::<String, String>::new(1000)));
/// let cancel = CancellationToken::new();
/// let handle = spawn_reaper(Arc::downgrade(&store), Duration::from_secs(5), cancel.clone(), &Handle::current());
/// // Later:
/// cancel.cancel();
/// handle.await?;
/// ```
pub fn spawn_reaper<K, V>(
    store: Weak<Mutex<CacheStore<K, V>>>,
    interval: Duration,
    cancel: CancellationToken,
    runtime: &Handle,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    runtime.spawn(async move {
        debug!("Starting reaper with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Reaper cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            let Some(shared) = store.upgrade() else {
                debug!("Cache dropped, reaper exiting");
                break;
            };

            let (report, remaining) = {
                let mut guard = shared.lock();
                let report = guard.sweep(&mut rand::thread_rng());
                (report, guard.len())
            };

            if report.reaped > 0 {
                info!(
                    "Sweep: reaped {} expired entries in {} batches, {} remaining",
                    report.reaped, report.batches, remaining
                );
            } else {
                debug!("Sweep: no expired entries among {} sampled", report.sampled);
            }
        }
    })
}
