//! Stale Sweep Task
//!
//! Background task that periodically reclaims stale records from a
//! persistent cache. Reads already hide stale records; this only frees storage.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::VersionedPersistentCache;

/// Spawns a background task that periodically purges stale records.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. A failed sweep is logged and retried on the next tick.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = VersionedPersistentCache::<Value>::in_memory(options)?;
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<T>(
    cache: VersionedPersistentCache<T>,
    sweep_interval_secs: u64,
) -> JoinHandle<()>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stale sweep task for '{}' every {} seconds",
            cache.namespace(),
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.purge_stale().await {
                Ok(0) => debug!("Stale sweep: no stale records found"),
                Ok(removed) => info!("Stale sweep: removed {} stale records", removed),
                Err(e) => warn!("Stale sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PersistentCacheOptions;

    #[tokio::test]
    async fn test_sweep_task_removes_expired_records() {
        let cache = VersionedPersistentCache::<String>::in_memory(
            PersistentCacheOptions::new("sweep", 1).with_ttl(1),
        )
        .unwrap();
        cache.set("expire_soon", &"value".to_string()).await.unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);

        // Wait for the record to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(
            cache.keys().await.unwrap().is_empty(),
            "Expired record should have been swept"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_records() {
        let cache = VersionedPersistentCache::<String>::in_memory(
            PersistentCacheOptions::new("sweep", 1).with_ttl(3600),
        )
        .unwrap();
        cache.set("long_lived", &"value".to_string()).await.unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            cache.get("long_lived").await.unwrap(),
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache =
            VersionedPersistentCache::<String>::in_memory(PersistentCacheOptions::new("sweep", 1))
                .unwrap();

        let handle = spawn_sweep_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
