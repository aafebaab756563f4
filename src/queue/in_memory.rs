//! In-memory work queue for testing and single-process scenarios.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{ClaimedJob, QueueError, SyncJob, WorkQueue};

struct QueueItem {
    id: u64,
    job: SyncJob,
    claimed: bool,
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    items: Vec<QueueItem>,
}

/// Thread-safe FIFO work queue. Clones share the same items.
///
/// Claims hand out the oldest unclaimed item; released items keep their
/// position.
///
/// ## Example
///
/// ```
/// use registry_sync::queue::{InMemoryWorkQueue, SyncJob, WorkQueue};
///
/// let queue = InMemoryWorkQueue::new();
/// queue.create_item(SyncJob::new("7")).unwrap();
///
/// let claimed = queue.claim_item().unwrap().unwrap();
/// assert!(queue.claim_item().unwrap().is_none());
///
/// queue.release_item(&claimed).unwrap();
/// assert_eq!(queue.claim_item().unwrap().unwrap().job, SyncJob::new("7"));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryWorkQueue {
    state: Arc<Mutex<QueueState>>,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, QueueState>, QueueError> {
        self.state
            .lock()
            .map_err(|_| QueueError::Backend("queue lock poisoned".into()))
    }

    /// Jobs in queue order, claimed or not.
    pub fn jobs(&self) -> Vec<SyncJob> {
        match self.state() {
            Ok(state) => state.items.iter().map(|item| item.job.clone()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn claimed_count(&self) -> usize {
        match self.state() {
            Ok(state) => state.items.iter().filter(|item| item.claimed).count(),
            Err(_) => 0,
        }
    }
}

impl WorkQueue for InMemoryWorkQueue {
    fn create_item(&self, job: SyncJob) -> Result<u64, QueueError> {
        let mut state = self.state()?;
        state.next_id += 1;
        let id = state.next_id;
        state.items.push(QueueItem {
            id,
            job,
            claimed: false,
        });
        Ok(id)
    }

    fn claim_item(&self) -> Result<Option<ClaimedJob>, QueueError> {
        let mut state = self.state()?;
        let claimed = state.items.iter_mut().find(|item| !item.claimed).map(|item| {
            item.claimed = true;
            ClaimedJob {
                item_id: item.id,
                job: item.job.clone(),
            }
        });
        Ok(claimed)
    }

    fn delete_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
        let mut state = self.state()?;
        let position = state
            .items
            .iter()
            .position(|queued| queued.id == item.item_id && queued.claimed)
            .ok_or(QueueError::UnknownItem(item.item_id))?;
        state.items.remove(position);
        Ok(())
    }

    fn release_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
        let mut state = self.state()?;
        let queued = state
            .items
            .iter_mut()
            .find(|queued| queued.id == item.item_id && queued.claimed)
            .ok_or(QueueError::UnknownItem(item.item_id))?;
        queued.claimed = false;
        Ok(())
    }

    fn number_of_items(&self) -> Result<usize, QueueError> {
        Ok(self.state()?.items.len())
    }
}
