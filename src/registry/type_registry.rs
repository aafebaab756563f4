use std::any::{self, Any};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::type_name_from_class;
use crate::config::SyncConfig;
use crate::error::RegistryError;
use crate::failure::FailureRecorder;
use crate::record::{Record, RecordHooks};
use crate::storage::{shared_client, ClientFactory, NotFoundSignature, StorageEngine};
use crate::transport::RemoteClient;

struct Slot {
    record_type: &'static str,
    engine: Arc<dyn Any + Send + Sync>,
}

/// Vends one [`StorageEngine`] per type name for the registry's lifetime.
///
/// Engines share the registry's client factory, failure recorder and
/// not-found signature. A type name stays bound to the record type that
/// first claimed it.
pub struct TypeRegistry {
    engines: Mutex<HashMap<String, Slot>>,
    client_factory: ClientFactory,
    recorder: Arc<FailureRecorder>,
    not_found: NotFoundSignature,
}

impl TypeRegistry {
    pub fn new(
        config: &SyncConfig,
        client_factory: ClientFactory,
        recorder: Arc<FailureRecorder>,
    ) -> Self {
        Self {
            engines: Mutex::new(HashMap::new()),
            client_factory,
            recorder,
            not_found: NotFoundSignature::from_config(config),
        }
    }

    /// Registry whose engines all talk through `client`.
    pub fn with_client(
        config: &SyncConfig,
        client: Arc<dyn RemoteClient>,
        recorder: Arc<FailureRecorder>,
    ) -> Self {
        Self::new(config, shared_client(client), recorder)
    }

    /// Registry that builds an HTTP client from `config` on first use.
    #[cfg(feature = "http")]
    pub fn from_config(config: &SyncConfig, recorder: Arc<FailureRecorder>) -> Self {
        use crate::transport::{HttpRemoteClient, TransportError};

        let client_config = config.clone();
        let factory: ClientFactory = Arc::new(move || -> Result<Arc<dyn RemoteClient>, TransportError> {
            let client = HttpRemoteClient::from_config(&client_config)?;
            Ok(Arc::new(client) as Arc<dyn RemoteClient>)
        });
        Self::new(config, factory, recorder)
    }

    pub fn recorder(&self) -> &Arc<FailureRecorder> {
        &self.recorder
    }

    /// The engine for `type_name`, built on first request.
    pub fn storage_for<R: Record>(
        &self,
        type_name: &str,
    ) -> Result<Arc<StorageEngine<R>>, RegistryError> {
        self.resolve(type_name, None)
    }

    /// Like [`storage_for`](Self::storage_for), installing `hooks` when this
    /// call builds the engine. An engine that already exists keeps its hooks.
    pub fn storage_with_hooks<R: Record>(
        &self,
        type_name: &str,
        hooks: Arc<dyn RecordHooks<R>>,
    ) -> Result<Arc<StorageEngine<R>>, RegistryError> {
        self.resolve(type_name, Some(hooks))
    }

    /// The engine for `R` under the name derived from its Rust type name.
    pub fn storage_for_class<R: Record>(&self) -> Result<Arc<StorageEngine<R>>, RegistryError> {
        self.storage_for(&type_name_from_class(any::type_name::<R>()))
    }

    /// Type names with an engine, sorted.
    pub fn type_names(&self) -> Result<Vec<String>, RegistryError> {
        let engines = self.engines.lock().map_err(|_| RegistryError::Poisoned)?;
        let mut names: Vec<String> = engines.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn resolve<R: Record>(
        &self,
        type_name: &str,
        hooks: Option<Arc<dyn RecordHooks<R>>>,
    ) -> Result<Arc<StorageEngine<R>>, RegistryError> {
        let type_name = type_name.trim();
        if type_name.is_empty() {
            return Err(RegistryError::EmptyTypeName);
        }

        let mut engines = self.engines.lock().map_err(|_| RegistryError::Poisoned)?;
        if let Some(slot) = engines.get(type_name) {
            return Arc::clone(&slot.engine)
                .downcast::<StorageEngine<R>>()
                .map_err(|_| RegistryError::TypeMismatch {
                    type_name: type_name.to_string(),
                    bound: slot.record_type.to_string(),
                });
        }

        let mut engine = StorageEngine::<R>::new(
            type_name,
            Arc::clone(&self.client_factory),
            Arc::clone(&self.recorder),
        )
        .with_not_found(self.not_found.clone());
        if let Some(hooks) = hooks {
            engine = engine.with_hooks(hooks);
        }

        let engine = Arc::new(engine);
        engines.insert(
            type_name.to_string(),
            Slot {
                record_type: any::type_name::<R>(),
                engine: Arc::clone(&engine) as Arc<dyn Any + Send + Sync>,
            },
        );
        debug!(type_name, record_type = any::type_name::<R>(), "storage engine created");
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::InMemoryMessenger;
    use crate::record::{NoHooks, RecordMeta, TypeDescriptor};
    use crate::state::InMemoryStateStore;
    use crate::transport::InMemoryRemote;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    struct FirmRecord {
        #[serde(skip)]
        meta: RecordMeta,
    }

    impl Record for FirmRecord {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new("firms")
        }
        fn meta(&self) -> &RecordMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    struct Person {
        #[serde(skip)]
        meta: RecordMeta,
    }

    impl Record for Person {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new("people")
        }
        fn meta(&self) -> &RecordMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
    }

    fn registry() -> TypeRegistry {
        let config = SyncConfig::default();
        let recorder = Arc::new(FailureRecorder::from_config(
            &config,
            Arc::new(InMemoryStateStore::new()),
            Arc::new(InMemoryMessenger::new()),
        ));
        TypeRegistry::with_client(&config, Arc::new(InMemoryRemote::new()), recorder)
    }

    #[test]
    fn engines_are_memoized_per_type_name() {
        let registry = registry();
        let a = registry.storage_for::<FirmRecord>("firm").unwrap();
        let b = registry.storage_for::<FirmRecord>(" firm ").unwrap();
        let c = registry.storage_for::<FirmRecord>("firm_archive").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.type_name(), "firm");
        assert_eq!(registry.type_names().unwrap(), vec!["firm", "firm_archive"]);
    }

    #[test]
    fn class_lookup_uses_derived_name() {
        let registry = registry();
        let engine = registry.storage_for_class::<FirmRecord>().unwrap();
        assert_eq!(engine.type_name(), "firm_record");
        assert!(Arc::ptr_eq(
            &engine,
            &registry.storage_for::<FirmRecord>("firm_record").unwrap()
        ));
    }

    #[test]
    fn rebinding_a_name_to_another_type_fails() {
        let registry = registry();
        registry.storage_for::<FirmRecord>("firm").unwrap();

        match registry.storage_for::<Person>("firm") {
            Err(RegistryError::TypeMismatch { type_name, bound }) => {
                assert_eq!(type_name, "firm");
                assert!(bound.ends_with("FirmRecord"));
            }
            other => panic!("expected a type mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_type_name_is_rejected() {
        let registry = registry();
        assert!(matches!(
            registry.storage_with_hooks::<FirmRecord>("  ", Arc::new(NoHooks)),
            Err(RegistryError::EmptyTypeName)
        ));
    }
}
