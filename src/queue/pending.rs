use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{QueueError, SyncJob, WorkQueue};
use crate::config::SyncConfig;
use crate::error::StateError;
use crate::record::normalize_identifier;
use crate::state::StateStore;

#[derive(Debug, Error)]
pub enum PendingError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Identifiers of one record type waiting to be queued for resync,
/// persisted in a [`StateStore`] so they survive restarts.
pub struct PendingResync {
    store: Arc<dyn StateStore>,
    key: String,
}

impl PendingResync {
    pub fn new(store: Arc<dyn StateStore>, prefix: &str, type_name: &str) -> Self {
        Self {
            store,
            key: format!("{}.{}", prefix, type_name),
        }
    }

    pub fn from_config(config: &SyncConfig, store: Arc<dyn StateStore>, type_name: &str) -> Self {
        Self::new(store, &config.pending_state_prefix, type_name)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remember `id`. Blank and already-pending ids are ignored; returns
    /// whether the id was added.
    pub fn mark(&self, id: &str) -> Result<bool, PendingError> {
        let id = normalize_identifier(id);
        if id.is_empty() {
            return Ok(false);
        }
        let mut ids = self.ids()?;
        if ids.contains(&id) {
            return Ok(false);
        }
        ids.push(id);
        self.store.set(&self.key, Value::from(ids))?;
        Ok(true)
    }

    pub fn ids(&self) -> Result<Vec<String>, PendingError> {
        let value = self.store.get(&self.key, Value::Array(Vec::new()))?;
        let ids: Vec<String> = serde_json::from_value(value).map_err(|err| StateError::Shape {
            key: self.key.clone(),
            reason: err.to_string(),
        })?;
        Ok(ids)
    }

    /// Enqueue one job per pending id, then forget them.
    ///
    /// On a queue error the ids that were not yet queued stay pending; the
    /// ones already queued are dropped from the list.
    pub fn flush_into<Q: WorkQueue + ?Sized>(&self, queue: &Q) -> Result<usize, PendingError> {
        let ids = self.ids()?;
        if ids.is_empty() {
            return Ok(0);
        }

        for (queued, id) in ids.iter().enumerate() {
            if let Err(err) = queue.create_item(SyncJob::new(id.as_str())) {
                self.store.set(&self.key, Value::from(ids[queued..].to_vec()))?;
                return Err(err.into());
            }
        }

        self.store.delete(&self.key)?;
        debug!(key = %self.key, count = ids.len(), "pending resyncs queued");
        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{ClaimedJob, InMemoryWorkQueue};
    use crate::state::InMemoryStateStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pending(store: &InMemoryStateStore) -> PendingResync {
        PendingResync::from_config(&SyncConfig::default(), Arc::new(store.clone()), "firm")
    }

    #[test]
    fn marks_are_normalized_and_unique() {
        let store = InMemoryStateStore::new();
        let pending = pending(&store);

        assert!(pending.mark(" AC100 ").unwrap());
        assert!(!pending.mark("ac100").unwrap());
        assert!(!pending.mark("  ").unwrap());
        assert!(pending.mark("ac200").unwrap());

        assert_eq!(pending.key(), "registry_sync.pending.firm");
        assert_eq!(pending.ids().unwrap(), vec!["ac100", "ac200"]);
    }

    #[test]
    fn flush_queues_and_clears() {
        let store = InMemoryStateStore::new();
        let pending = pending(&store);
        pending.mark("a").unwrap();
        pending.mark("b").unwrap();

        let queue = InMemoryWorkQueue::new();
        assert_eq!(pending.flush_into(&queue).unwrap(), 2);
        assert_eq!(queue.jobs(), vec![SyncJob::new("a"), SyncJob::new("b")]);
        assert!(pending.ids().unwrap().is_empty());
        assert_eq!(pending.flush_into(&queue).unwrap(), 0);
    }

    struct FailsAfter {
        inner: InMemoryWorkQueue,
        remaining: AtomicUsize,
    }

    impl WorkQueue for FailsAfter {
        fn create_item(&self, job: SyncJob) -> Result<u64, QueueError> {
            if self.remaining.load(Ordering::SeqCst) == 0 {
                return Err(QueueError::Backend("full".into()));
            }
            self.remaining.fetch_sub(1, Ordering::SeqCst);
            self.inner.create_item(job)
        }
        fn claim_item(&self) -> Result<Option<ClaimedJob>, QueueError> {
            self.inner.claim_item()
        }
        fn delete_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
            self.inner.delete_item(item)
        }
        fn release_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
            self.inner.release_item(item)
        }
        fn number_of_items(&self) -> Result<usize, QueueError> {
            self.inner.number_of_items()
        }
    }

    #[test]
    fn failed_flush_keeps_unqueued_ids() {
        let store = InMemoryStateStore::new();
        let pending = pending(&store);
        for id in ["a", "b", "c"] {
            pending.mark(id).unwrap();
        }

        let queue = FailsAfter {
            inner: InMemoryWorkQueue::new(),
            remaining: AtomicUsize::new(1),
        };
        assert!(matches!(
            pending.flush_into(&queue),
            Err(PendingError::Queue(QueueError::Backend(_)))
        ));
        assert_eq!(pending.ids().unwrap(), vec!["b", "c"]);
        assert_eq!(queue.inner.jobs(), vec![SyncJob::new("a")]);
    }
}
