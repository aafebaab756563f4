use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{ClaimedJob, QueueError, SuspendSignal, SyncJob, WorkQueue};
use crate::config::SyncConfig;
use crate::lock::LockManager;

/// How a single resync attempt went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResyncError {
    /// Worth retrying later; the item goes back to the queue.
    #[error("transient resync failure: {0}")]
    Transient(String),
    /// Retrying will not help; the item is dropped.
    #[error("permanent resync failure: {0}")]
    Permanent(String),
    /// Stop the drain now; the item goes back to the queue.
    #[error("resync suspended: {0}")]
    Suspend(String),
}

/// Re-synchronizes one external identifier.
pub trait ResyncHandler {
    fn resync(&mut self, external_id: &str, job: &SyncJob) -> Result<(), ResyncError>;
}

impl<F> ResyncHandler for F
where
    F: FnMut(&str, &SyncJob) -> Result<(), ResyncError>,
{
    fn resync(&mut self, external_id: &str, job: &SyncJob) -> Result<(), ResyncError> {
        self(external_id, job)
    }
}

/// Result of a batch drain operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainResult {
    pub claimed: usize,
    pub completed: usize,
    /// Returned to the queue: transient failures, busy locks, suspensions.
    pub released: usize,
    /// Dropped after a permanent failure.
    pub failed: usize,
    /// Dropped because the job carried no identifier.
    pub discarded: usize,
    pub suspended: bool,
}

/// Claims sync jobs and runs them through a [`ResyncHandler`] while holding
/// the identifier's lock.
///
/// An item whose lock is held elsewhere is released untouched. Releases are
/// deferred to the end of the drain so the same item is not claimed twice
/// in one pass.
pub struct ResyncWorker<H, M> {
    handler: H,
    locks: Arc<M>,
    worker_id: String,
    batch_size: usize,
    suspend: SuspendSignal,
}

impl<H, M> ResyncWorker<H, M> {
    pub fn new(handler: H, locks: Arc<M>) -> Self {
        Self {
            handler,
            locks,
            worker_id: format!("resync-{}", std::process::id()),
            batch_size: SyncConfig::default().resync_batch_size,
            suspend: SuspendSignal::new(),
        }
    }

    pub fn with_worker_id(mut self, id: impl Into<String>) -> Self {
        self.worker_id = id.into();
        self
    }

    /// Max items claimed per drain.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_suspend_signal(mut self, signal: SuspendSignal) -> Self {
        self.suspend = signal;
        self
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}

impl<H: ResyncHandler, M: LockManager> ResyncWorker<H, M> {
    pub fn drain<Q: WorkQueue + ?Sized>(&mut self, queue: &Q) -> DrainResult {
        let mut result = DrainResult::default();
        let mut deferred: Vec<ClaimedJob> = Vec::new();

        while result.claimed < self.batch_size {
            if self.suspend.is_requested() {
                result.suspended = true;
                break;
            }

            let claimed = match queue.claim_item() {
                Ok(Some(claimed)) => claimed,
                Ok(None) => break,
                Err(QueueError::Suspended(reason)) => {
                    info!(worker = %self.worker_id, %reason, "queue suspended");
                    result.suspended = true;
                    break;
                }
                Err(err) => {
                    error!(worker = %self.worker_id, error = %err, "could not claim sync job");
                    break;
                }
            };
            result.claimed += 1;

            let Some(id) = claimed.job.dedup_key() else {
                warn!(worker = %self.worker_id, item = claimed.item_id, "sync job without identifier dropped");
                if self.remove(queue, &claimed, &mut result) {
                    result.discarded += 1;
                }
                continue;
            };

            let guard = match self.locks.try_acquire(&id) {
                Ok(Some(guard)) => guard,
                Ok(None) => {
                    debug!(worker = %self.worker_id, identifier = %id, "identifier busy; releasing");
                    deferred.push(claimed);
                    continue;
                }
                Err(err) => {
                    warn!(worker = %self.worker_id, identifier = %id, error = %err, "lock acquire failed");
                    deferred.push(claimed);
                    continue;
                }
            };
            let outcome = self.handler.resync(&id, &claimed.job);
            drop(guard);

            match outcome {
                Ok(()) => {
                    if self.remove(queue, &claimed, &mut result) {
                        result.completed += 1;
                    }
                }
                Err(ResyncError::Transient(reason)) => {
                    warn!(worker = %self.worker_id, identifier = %id, %reason, "resync will be retried");
                    deferred.push(claimed);
                }
                Err(ResyncError::Suspend(reason)) => {
                    info!(worker = %self.worker_id, identifier = %id, %reason, "resync suspended");
                    deferred.push(claimed);
                    result.suspended = true;
                    break;
                }
                Err(ResyncError::Permanent(reason)) => {
                    error!(worker = %self.worker_id, identifier = %id, %reason, "resync failed permanently");
                    if self.remove(queue, &claimed, &mut result) {
                        result.failed += 1;
                    }
                }
            }

            if result.suspended {
                break;
            }
        }

        for claimed in &deferred {
            match queue.release_item(claimed) {
                Ok(()) => result.released += 1,
                Err(err) => {
                    warn!(worker = %self.worker_id, item = claimed.item_id, error = %err, "could not release sync job")
                }
            }
        }

        if result.claimed > 0 {
            info!(
                worker = %self.worker_id,
                claimed = result.claimed,
                completed = result.completed,
                released = result.released,
                failed = result.failed,
                "resync drain finished"
            );
        }
        result
    }

    /// Delete a finished item. `false` when the queue refused; a suspension
    /// from the queue marks the drain suspended.
    fn remove<Q: WorkQueue + ?Sized>(
        &self,
        queue: &Q,
        claimed: &ClaimedJob,
        result: &mut DrainResult,
    ) -> bool {
        match queue.delete_item(claimed) {
            Ok(()) => true,
            Err(QueueError::Suspended(reason)) => {
                info!(worker = %self.worker_id, %reason, "queue suspended on delete");
                result.suspended = true;
                false
            }
            Err(err) => {
                warn!(worker = %self.worker_id, item = claimed.item_id, error = %err, "could not delete sync job");
                false
            }
        }
    }
}
