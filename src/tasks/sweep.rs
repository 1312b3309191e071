//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! Lazy eviction on read already keeps expired values from being served;
//! the sweep bounds memory for keys that are written once and never read.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Something the sweeper can purge of expired entries.
pub trait Sweep: Send + Sync + 'static {
    /// Removes every expired entry and returns how many were removed.
    fn sweep_expired(&self) -> usize;
}

/// Spawns a background task that sweeps `target` every `interval`.
///
/// The task holds only a weak reference, so it never keeps the cache alive;
/// it exits on the first tick after the last strong reference is gone.
/// Must be called from within a tokio runtime.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_sweep_task<S: Sweep>(target: Weak<S>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let Some(target) = target.upgrade() else {
                debug!("Cache dropped, TTL sweep task exiting");
                break;
            };
            let removed = target.sweep_expired();
            drop(target);

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
