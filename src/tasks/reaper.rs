//! Expiration Reaper
//!
//! Background task that periodically evicts logically expired entries that
//! no read has touched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::error::{CacheError, Result};

/// Shortest period the reaper will run at
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running reaper. Dropping it also stops the task.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the reaper to stop and waits for it to exit.
    pub async fn shutdown(self) {
        // The task may already be gone, in which case there is no receiver
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            error!(error = %err, "Expiration reaper did not exit cleanly");
        }
    }
}

/// Spawns the reaper on the current tokio runtime.
///
/// A sweep runs every `interval`, the first one a full interval after start.
/// A failed sweep is logged and the schedule continues.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::new());
/// let reaper = spawn_reaper(store.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// reaper.shutdown().await;
/// ```
pub fn spawn_reaper(store: Arc<CacheStore>, interval: Duration) -> ReaperHandle {
    spawn_reaper_with(store, interval, CacheStore::purge_expired)
}

/// Same as [`spawn_reaper`], with `sweep` doing the removal on each tick.
pub(crate) fn spawn_reaper_with<F>(
    store: Arc<CacheStore>,
    interval: Duration,
    sweep: F,
) -> ReaperHandle
where
    F: Fn(&CacheStore, Instant) -> usize + Send + Sync + 'static,
{
    let period = if interval.is_zero() {
        warn!("Reaper interval of zero requested, using {:?}", MIN_INTERVAL);
        MIN_INTERVAL
    } else {
        interval
    };
    let sweep = Arc::new(sweep);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!(
            interval_ms = period.as_millis() as u64,
            "Starting expiration reaper"
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match run_cycle(&store, &sweep).await {
                        Ok(removed) if removed > 0 => {
                            info!("Reaper: removed {} expired entries", removed);
                        }
                        Ok(_) => debug!("Reaper: no expired entries found"),
                        Err(err) => error!(error = %err, "Reaper cycle failed"),
                    }
                }
                // Fires on an explicit signal or when the handle is dropped
                _ = shutdown_rx.changed() => break,
            }
        }

        info!("Expiration reaper stopped");
    });

    ReaperHandle {
        shutdown: shutdown_tx,
        task,
    }
}

/// Runs a single sweep, removing entries expired as of the sweep's start.
pub async fn reap_expired(store: &Arc<CacheStore>) -> Result<usize> {
    run_cycle(store, &Arc::new(CacheStore::purge_expired)).await
}

/// Runs `sweep` on the blocking pool; a panic inside it becomes an error
/// rather than taking the caller down.
async fn run_cycle<F>(store: &Arc<CacheStore>, sweep: &Arc<F>) -> Result<usize>
where
    F: Fn(&CacheStore, Instant) -> usize + Send + Sync + 'static,
{
    let cycle_start = Instant::now();
    let sweep_store = Arc::clone(store);
    let sweep = Arc::clone(sweep);

    let outcome =
        tokio::task::spawn_blocking(move || (*sweep)(sweep_store.as_ref(), cycle_start)).await;

    match outcome {
        Ok(removed) => {
            store.stats().record_reaper_cycle(removed);
            Ok(removed)
        }
        Err(err) => {
            store.stats().record_reaper_failure();
            Err(CacheError::Internal(format!("reaper sweep aborted: {err}")))
        }
    }
}
