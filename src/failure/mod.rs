//! Failure capture for registry calls.
//!
//! Every failed remote call becomes one [`FailureRecord`] appended to a
//! durable [`FailureLog`], one line in the general log, and at most one
//! user-facing warning per identifier.

mod log;
mod messenger;
mod record;
mod recorder;

pub use log::{FailureLog, StateFailureLog};
#[cfg(feature = "emitter")]
pub use messenger::EmitterMessenger;
pub use messenger::{InMemoryMessenger, Messenger, Notice, NoticeLevel};
pub use record::{FailureRecord, SyncOperation};
pub use recorder::FailureRecorder;
