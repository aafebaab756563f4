//! Work queue wrapper that reports a suspension on a chosen delete.

use std::sync::atomic::{AtomicUsize, Ordering};

use registry_sync::queue::ClaimedJob;
use registry_sync::{InMemoryWorkQueue, QueueError, SyncJob, WorkQueue};

pub struct SuspendingQueue {
    pub inner: InMemoryWorkQueue,
    deletes_before_suspend: AtomicUsize,
}

impl SuspendingQueue {
    /// Suspend on the delete following `deletes` successful ones.
    pub fn after_deletes(deletes: usize) -> Self {
        Self {
            inner: InMemoryWorkQueue::new(),
            deletes_before_suspend: AtomicUsize::new(deletes),
        }
    }
}

impl WorkQueue for SuspendingQueue {
    fn create_item(&self, job: SyncJob) -> Result<u64, QueueError> {
        self.inner.create_item(job)
    }

    fn claim_item(&self) -> Result<Option<ClaimedJob>, QueueError> {
        self.inner.claim_item()
    }

    fn delete_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
        let remaining = self.deletes_before_suspend.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(QueueError::Suspended("maintenance window".into()));
        }
        self.deletes_before_suspend.store(remaining - 1, Ordering::SeqCst);
        self.inner.delete_item(item)
    }

    fn release_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
        self.inner.release_item(item)
    }

    fn number_of_items(&self) -> Result<usize, QueueError> {
        self.inner.number_of_items()
    }
}
