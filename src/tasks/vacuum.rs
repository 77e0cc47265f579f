//! Vacuum Task
//!
//! Background task that periodically evicts expired items from a cache and
//! deletes their files.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::Shared;
use crate::error::{CacheError, Result};

// == Vacuum Handle ==
/// Owner side of a running vacuum task.
///
/// Dropping the handle also stops the task, without waiting for it.
#[derive(Debug)]
pub struct VacuumHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl VacuumHandle {
    // == Stop ==
    /// Requests a stop and waits until the task has exited.
    ///
    /// A sweep already in progress runs to completion first.
    pub async fn stop(self) {
        // Err means the task is already gone
        let _ = self.stop_tx.send(());

        if let Err(e) = self.task.await {
            warn!(error = %e, "Vacuum task did not exit cleanly");
        }
    }

    // == Is Finished ==
    /// Checks whether the task has exited, e.g. after a panic in a sweep.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// == Spawn Vacuum Task ==
/// Spawns the vacuum task for `shared`, sweeping every `interval`.
///
/// A zero interval disables vacuuming and returns `None`.
pub(crate) fn spawn_vacuum_task(
    shared: Arc<Shared>,
    interval: Duration,
) -> Result<Option<VacuumHandle>> {
    if interval.is_zero() {
        debug!(namespace = %shared.paths.namespace(), "Vacuum disabled");
        return Ok(None);
    }

    let runtime = Handle::try_current()
        .map_err(|e| CacheError::Internal(format!("vacuum task needs a tokio runtime: {e}")))?;

    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let task = runtime.spawn(async move {
        let namespace = shared.paths.namespace().to_string();
        info!(
            namespace = %namespace,
            interval_ms = interval.as_millis() as u64,
            "Starting vacuum task"
        );

        loop {
            tokio::select! {
                biased;

                // Also fires when the handle is dropped
                _ = &mut stop_rx => break,

                _ = tokio::time::sleep(interval) => {
                    let removed = shared.sweep_expired().await;

                    if removed > 0 {
                        info!(namespace = %namespace, removed, "Vacuum: removed expired items");
                    } else {
                        debug!(namespace = %namespace, "Vacuum: no expired items found");
                    }
                }
            }
        }

        info!(namespace = %namespace, "Vacuum task stopped");
    });

    Ok(Some(VacuumHandle { stop_tx, task }))
}
