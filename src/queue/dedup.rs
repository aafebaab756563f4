use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::{ClaimedJob, QueueError, SyncJob, WorkQueue};
use crate::config::SyncConfig;

/// Shared flag asking a drain to stop at the next item.
#[derive(Clone, Default, Debug)]
pub struct SuspendSignal(Arc<AtomicBool>);

impl SuspendSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one dedup pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupReport {
    /// Items claimed during the drain.
    pub claimed: usize,
    /// Keyed items taken off the queue and folded into the dedup map.
    pub collected: usize,
    /// Items put back, one per distinct identifier.
    pub requeued: usize,
    /// Items skipped after a per-item error.
    pub skipped: usize,
    /// Items with no identifier, released untouched.
    pub unkeyed: usize,
    /// Re-enqueues that failed; those jobs are lost.
    pub lost: usize,
    pub suspended: bool,
    /// The drain stopped at the claim bound before the queue ran dry.
    pub exhausted: bool,
}

impl DedupReport {
    /// Duplicate jobs removed by the pass.
    pub fn collapsed(&self) -> usize {
        self.collected.saturating_sub(self.requeued + self.lost)
    }
}

/// Collapses pending jobs for the same identifier into one.
///
/// The drain claims items until the queue is empty, keeping the last job
/// seen per identifier and deleting the claimed copies, then re-enqueues one
/// job per identifier in first-seen order. A suspension (signal or
/// `QueueError::Suspended` from the queue) releases the current item and
/// ends the drain; everything already collected is still re-enqueued.
pub struct QueueDeduplicator {
    max_claims: usize,
    suspend: SuspendSignal,
}

impl Default for QueueDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueDeduplicator {
    pub fn new() -> Self {
        Self {
            max_claims: SyncConfig::default().dedup_max_claims,
            suspend: SuspendSignal::new(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new().with_max_claims(config.dedup_max_claims)
    }

    /// Upper bound on claims per drain, guarding against a backend that
    /// never reports empty.
    pub fn with_max_claims(mut self, max: usize) -> Self {
        self.max_claims = max;
        self
    }

    pub fn with_suspend_signal(mut self, signal: SuspendSignal) -> Self {
        self.suspend = signal;
        self
    }

    pub fn suspend_signal(&self) -> SuspendSignal {
        self.suspend.clone()
    }

    pub fn run<Q: WorkQueue + ?Sized>(&self, queue: &Q) -> DedupReport {
        let mut report = DedupReport::default();
        let mut latest: HashMap<String, SyncJob> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        // Released after the drain so they are not claimed again in this pass.
        let mut held_back: Vec<ClaimedJob> = Vec::new();

        loop {
            if report.claimed >= self.max_claims {
                warn!(max_claims = self.max_claims, "dedup drain hit its claim bound");
                report.exhausted = true;
                break;
            }

            let claimed = match queue.claim_item() {
                Ok(Some(claimed)) => claimed,
                Ok(None) => break,
                Err(QueueError::Suspended(reason)) => {
                    info!(%reason, "queue suspended before claim");
                    report.suspended = true;
                    break;
                }
                Err(err) => {
                    error!(error = %err, "could not claim from sync queue; ending drain");
                    break;
                }
            };
            report.claimed += 1;

            if self.suspend.is_requested() {
                release(queue, &claimed);
                report.suspended = true;
                break;
            }

            let Some(key) = claimed.job.dedup_key() else {
                report.unkeyed += 1;
                held_back.push(claimed);
                continue;
            };

            match queue.delete_item(&claimed) {
                Ok(()) => {
                    if !latest.contains_key(&key) {
                        order.push(key.clone());
                    }
                    latest.insert(key, claimed.job);
                    report.collected += 1;
                }
                Err(QueueError::Suspended(reason)) => {
                    info!(%reason, item = claimed.item_id, "queue suspended mid-drain");
                    release(queue, &claimed);
                    report.suspended = true;
                    break;
                }
                Err(err) => {
                    warn!(error = %err, item = claimed.item_id, "skipping sync queue item");
                    report.skipped += 1;
                    held_back.push(claimed);
                }
            }
        }

        for claimed in &held_back {
            release(queue, claimed);
        }

        for key in order {
            let Some(job) = latest.remove(&key) else {
                continue;
            };
            match queue.create_item(job) {
                Ok(_) => report.requeued += 1,
                Err(err) => {
                    error!(error = %err, identifier = %key, "could not re-enqueue deduplicated job");
                    report.lost += 1;
                }
            }
        }

        info!(
            claimed = report.claimed,
            requeued = report.requeued,
            collapsed = report.collapsed(),
            skipped = report.skipped,
            suspended = report.suspended,
            "sync queue dedup finished"
        );
        report
    }
}

fn release<Q: WorkQueue + ?Sized>(queue: &Q, claimed: &ClaimedJob) {
    if let Err(err) = queue.release_item(claimed) {
        warn!(error = %err, item = claimed.item_id, "could not release sync queue item");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryWorkQueue;

    fn ids(queue: &InMemoryWorkQueue) -> Vec<String> {
        queue
            .jobs()
            .into_iter()
            .filter_map(|job| job.external_id)
            .collect()
    }

    #[test]
    fn collapses_duplicates_keeping_last_job() {
        let queue = InMemoryWorkQueue::new();
        queue.create_item(SyncJob::new("7").with_change_marker("first")).unwrap();
        queue.create_item(SyncJob::new("7").with_change_marker("second")).unwrap();
        queue.create_item(SyncJob::new("9")).unwrap();

        let report = QueueDeduplicator::new().run(&queue);

        assert_eq!(report.claimed, 3);
        assert_eq!(report.requeued, 2);
        assert_eq!(report.collapsed(), 1);
        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0], SyncJob::new("7").with_change_marker("second"));
        assert_eq!(jobs[1], SyncJob::new("9"));
    }

    #[test]
    fn first_seen_order_is_kept() {
        let queue = InMemoryWorkQueue::new();
        for id in ["b", "a", "b", "c", "a"] {
            queue.create_item(SyncJob::new(id)).unwrap();
        }

        QueueDeduplicator::new().run(&queue);
        assert_eq!(ids(&queue), vec!["b", "a", "c"]);
    }

    #[test]
    fn suspension_releases_current_item() {
        let queue = InMemoryWorkQueue::new();
        queue.create_item(SyncJob::new("1")).unwrap();
        queue.create_item(SyncJob::new("2")).unwrap();

        let dedup = QueueDeduplicator::new();
        dedup.suspend_signal().request();
        let report = dedup.run(&queue);

        assert!(report.suspended);
        assert_eq!(report.requeued, 0);
        assert_eq!(queue.number_of_items().unwrap(), 2);
        assert_eq!(queue.claimed_count(), 0);
    }

    #[test]
    fn unkeyed_items_are_left_in_place() {
        let queue = InMemoryWorkQueue::new();
        queue.create_item(SyncJob::default()).unwrap();
        queue.create_item(SyncJob::new("1")).unwrap();
        queue.create_item(SyncJob::new("1")).unwrap();

        let report = QueueDeduplicator::new().run(&queue);

        assert_eq!(report.unkeyed, 1);
        assert_eq!(queue.number_of_items().unwrap(), 2);
        assert_eq!(queue.claimed_count(), 0);
    }

    #[test]
    fn claim_bound_stops_the_drain() {
        let queue = InMemoryWorkQueue::new();
        for id in ["1", "1", "2", "3"] {
            queue.create_item(SyncJob::new(id)).unwrap();
        }

        let report = QueueDeduplicator::new().with_max_claims(2).run(&queue);

        assert!(report.exhausted);
        assert_eq!(report.claimed, 2);
        assert_eq!(ids(&queue), vec!["2", "3", "1"]);
    }

    /// Fails the first delete with a backend error.
    struct FlakyDeletes {
        inner: InMemoryWorkQueue,
        failed_once: AtomicBool,
    }

    impl WorkQueue for FlakyDeletes {
        fn create_item(&self, job: SyncJob) -> Result<u64, QueueError> {
            self.inner.create_item(job)
        }

        fn claim_item(&self) -> Result<Option<ClaimedJob>, QueueError> {
            self.inner.claim_item()
        }

        fn delete_item(&self, item: &ClaimedJob) -> Result<(), QueueError> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(QueueError::Backend("connection reset".into()));
            }
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
    fn skipped_item_is_released_not_stranded() {
        let queue = FlakyDeletes {
            inner: InMemoryWorkQueue::new(),
            failed_once: AtomicBool::new(false),
        };
        queue.create_item(SyncJob::new("7")).unwrap();
        queue.create_item(SyncJob::new("9")).unwrap();

        let report = QueueDeduplicator::new().run(&queue);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.claimed, 2);
        assert_eq!(queue.inner.claimed_count(), 0);
        assert_eq!(ids(&queue.inner), vec!["7", "9"]);
    }
}
