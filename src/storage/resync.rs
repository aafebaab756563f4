use std::sync::Arc;

use tracing::debug;

use super::{Refresh, StorageEngine};
use crate::queue::{ResyncError, ResyncHandler, SyncJob};
use crate::record::Record;

/// Resync handler that forces a registry round trip through a storage engine.
///
/// A record the registry no longer has counts as done: the engine already
/// retired the local mirror. A failed call is retried later, and a type
/// that cannot be read at all is a permanent failure.
pub struct StorageResync<R: Record> {
    engine: Arc<StorageEngine<R>>,
}

impl<R: Record> StorageResync<R> {
    pub fn new(engine: Arc<StorageEngine<R>>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<StorageEngine<R>> {
        &self.engine
    }
}

impl<R: Record> ResyncHandler for StorageResync<R> {
    fn resync(&mut self, external_id: &str, _job: &SyncJob) -> Result<(), ResyncError> {
        match self.engine.refresh(external_id) {
            Ok(Refresh::Loaded(_)) => Ok(()),
            Ok(Refresh::Missing) => {
                debug!(type_name = %self.engine.type_name(), identifier = external_id, "resync found no registry data");
                Ok(())
            }
            Ok(Refresh::Failed) => Err(ResyncError::Transient(format!(
                "registry refresh of {} `{}` failed",
                self.engine.type_name(),
                external_id
            ))),
            Err(err) => Err(ResyncError::Permanent(err.to_string())),
        }
    }
}
