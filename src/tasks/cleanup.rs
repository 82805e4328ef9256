//! TTL Cleanup Task
//!
//! Background task that periodically reclaims expired cache entries so memory is
//! bounded even for keys that are never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Cache, Codec};

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Each sweep walks the shards in batches of the cache's `sweep_batch_size`, so
/// no shard lock is held for longer than one batch.
///
/// # Arguments
/// * `cache` - Handle to the cache; the task keeps its own clone
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Cache::new(CacheConfig::default());
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<C: Codec>(cache: Cache<C>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; wait a full interval before sweeping
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.evict_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
