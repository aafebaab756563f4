//! Sync work queue - at-least-once "resync this record" jobs.
//!
//! ## Architecture
//!
//! ```text
//!   producers ──create_item──▶ ┌───────────────┐
//!                              │   WorkQueue   │ ◀──claim/delete/release──┐
//!   PendingResync ──flush────▶ └───────────────┘                          │
//!                                     ▲                                   │
//!                      QueueDeduplicator (collapse per identifier)   ResyncWorker
//!                                                                    + LockManager
//!                                                                    + ResyncHandler
//! ```

mod dedup;
mod in_memory;
mod job;
mod pending;
mod worker;

use thiserror::Error;

pub use dedup::{DedupReport, QueueDeduplicator, SuspendSignal};
pub use in_memory::InMemoryWorkQueue;
pub use job::{ClaimedJob, SyncJob};
pub use pending::{PendingError, PendingResync};
pub use worker::{DrainResult, ResyncError, ResyncHandler, ResyncWorker};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Processing should stop for now; the current item must be released.
    #[error("queue suspended: {0}")]
    Suspended(String),
    #[error("queue item {0} is not claimed or no longer exists")]
    UnknownItem(u64),
    #[error("queue backend error: {0}")]
    Backend(String),
}

/// Work queue contract.
///
/// `claim_item` is exclusive: no two consumers observe the same item until
/// it is released.
pub trait WorkQueue: Send + Sync {
    fn create_item(&self, job: SyncJob) -> Result<u64, QueueError>;

    fn claim_item(&self) -> Result<Option<ClaimedJob>, QueueError>;

    fn delete_item(&self, item: &ClaimedJob) -> Result<(), QueueError>;

    /// Return a claimed item to the queue unprocessed.
    fn release_item(&self, item: &ClaimedJob) -> Result<(), QueueError>;

    /// Items in the queue, claimed or not.
    fn number_of_items(&self) -> Result<usize, QueueError>;
}
