pub mod config;
pub mod error;
pub mod failure;
pub mod lock;
pub mod queue;
pub mod record;
pub mod registry;
pub mod state;
pub mod storage;
pub mod transport;

pub use config::SyncConfig;
pub use error::{ConfigError, MappingIncomplete, RegistryError, StateError};
pub use failure::{
    FailureLog, FailureRecord, FailureRecorder, InMemoryMessenger, Messenger, Notice, NoticeLevel,
    StateFailureLog, SyncOperation,
};
pub use lock::{IdentifierGuard, InMemoryLockManager, LockError, LockManager};
pub use queue::{
    DedupReport, DrainResult, InMemoryWorkQueue, QueueDeduplicator, QueueError, ResyncError,
    ResyncHandler, ResyncWorker, SyncJob, WorkQueue,
};
pub use record::{
    normalize_identifier, Format, HttpVerb, NoHooks, Operation, Record, RecordHooks, RecordMeta,
    TypeDescriptor,
};
pub use registry::{type_name_from_class, TypeRegistry};
pub use state::{FileStateStore, InMemoryStateStore, StateStore};
pub use storage::{DeleteReport, Refresh, SaveOutcome, StorageEngine, StorageResync};
pub use transport::{RemoteClient, RemoteRequest, RemoteResponse, TransportError};

#[cfg(feature = "emitter")]
pub use failure::EmitterMessenger;

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
