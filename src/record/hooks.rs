use serde_json::{Map, Value};

use super::Record;

/// Lifecycle callbacks a storage engine invokes for one record type.
///
/// Every method defaults to a no-op, so a type only overrides the points it
/// cares about. The engine holds one hooks object per type.
pub trait RecordHooks<R: Record>: Send + Sync {
    /// Mutate the raw values before a new record is built from them.
    fn before_create(&self, _values: &mut Map<String, Value>) {}

    fn after_create(&self, _record: &mut R) {}

    fn before_save(&self, _record: &mut R) {}

    /// `was_update` is false when the save created the record remotely.
    fn after_save(&self, _record: &mut R, _was_update: bool) {}

    fn before_delete(&self, _records: &[R]) {}

    fn after_delete(&self, _records: &[R]) {}

    /// Inspect or prune a freshly loaded batch before it is cached.
    fn after_load_batch(&self, _records: &mut Vec<R>) {}

    /// The registry reported "no data" for `identifier`; drop any local mirror.
    fn retire_local_mirror(&self, _identifier: &str) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<R: Record> RecordHooks<R> for NoHooks {}
