//! Wiring shared by the suites: scripted registry, state, messenger, recorder.

use std::sync::Arc;

use registry_sync::storage::shared_client;
use registry_sync::transport::InMemoryRemote;
use registry_sync::{
    FailureRecord, FailureRecorder, InMemoryMessenger, InMemoryStateStore, Notice, Record,
    StorageEngine, SyncConfig, TypeRegistry,
};

pub const NO_DATA: &str = "SyncErrorCode: 99 | No data";

/// Route engine logs to the test output; `RUST_LOG=registry_sync=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Harness {
    pub config: SyncConfig,
    pub remote: InMemoryRemote,
    pub store: InMemoryStateStore,
    pub messenger: Arc<InMemoryMessenger>,
    pub recorder: Arc<FailureRecorder>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let config = SyncConfig::default();
        let store = InMemoryStateStore::new();
        let messenger = Arc::new(InMemoryMessenger::new());
        let recorder = Arc::new(FailureRecorder::from_config(
            &config,
            Arc::new(store.clone()),
            messenger.clone(),
        ));
        Self {
            config,
            remote: InMemoryRemote::new(),
            store,
            messenger,
            recorder,
        }
    }

    pub fn engine<R: Record>(&self, type_name: &str) -> StorageEngine<R> {
        StorageEngine::new(
            type_name,
            shared_client(Arc::new(self.remote.clone())),
            Arc::clone(&self.recorder),
        )
    }

    pub fn registry(&self) -> TypeRegistry {
        TypeRegistry::with_client(
            &self.config,
            Arc::new(self.remote.clone()),
            Arc::clone(&self.recorder),
        )
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        self.recorder.entries().unwrap()
    }

    pub fn warnings(&self) -> Vec<Notice> {
        self.messenger.warnings()
    }
}
