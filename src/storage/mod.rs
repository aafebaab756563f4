//! Storage engines - records of one type behaving like a local repository
//! backed by the remote registry.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use registry_sync::storage::{shared_client, StorageEngine};
//! use registry_sync::transport::{InMemoryRemote, RemoteResponse};
//! use registry_sync::{
//!     FailureRecorder, HttpVerb, InMemoryMessenger, InMemoryStateStore, Record, RecordMeta,
//!     SyncConfig, TypeDescriptor,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize)]
//! struct Firm {
//!     #[serde(skip)]
//!     meta: RecordMeta,
//!     firm: String,
//!     name: String,
//! }
//!
//! impl Record for Firm {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::new("firms").with_id_key("firm")
//!     }
//!     fn meta(&self) -> &RecordMeta { &self.meta }
//!     fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
//! }
//!
//! let remote = InMemoryRemote::new();
//! remote.respond_to(
//!     HttpVerb::Get,
//!     "firms",
//!     &[("firm", "ac100")],
//!     RemoteResponse::ok_json(json!({"firm": "AC100", "name": "Acme"})),
//! );
//!
//! let recorder = Arc::new(FailureRecorder::from_config(
//!     &SyncConfig::default(),
//!     Arc::new(InMemoryStateStore::new()),
//!     Arc::new(InMemoryMessenger::new()),
//! ));
//! let engine: StorageEngine<Firm> =
//!     StorageEngine::new("firm", shared_client(Arc::new(remote.clone())), recorder);
//!
//! let firm = engine.load(" AC100 ").unwrap().unwrap();
//! assert_eq!(firm.identifier(), Some("ac100"));
//! assert_eq!(firm.name, "Acme");
//!
//! // Served from the cache the second time.
//! engine.load("ac100").unwrap();
//! assert_eq!(remote.request_count(), 1);
//! ```

mod cache;
mod engine;
mod outcome;
mod resync;

pub use engine::{shared_client, ClientFactory, NotFoundSignature, StorageEngine};
pub use outcome::{DeleteReport, Refresh, SaveOutcome};
pub use resync::StorageResync;
