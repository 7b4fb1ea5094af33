//! Cache Sweep Task
//!
//! Background task that periodically drops an expired listing snapshot so a
//! stale list is not kept in memory between requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Clock, ListingCache};

/// Spawns a background task that clears the listing cache once it expires.
///
/// The task sleeps for `interval_secs` between runs and takes the write lock
/// only for the check itself.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cache_sweep_task(
    cache: Arc<RwLock<ListingCache>>,
    clock: Arc<dyn Clock>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs, "Starting listing cache sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let (cleared, stats) = {
                let mut guard = cache.write().await;
                (guard.clear_expired(clock.now_ms()), guard.stats())
            };

            if cleared {
                info!("Cache sweep: dropped expired listing snapshot");
            } else {
                debug!(hit_rate = stats.hit_rate(), "Cache sweep: nothing to drop");
            }
        }
    })
}
