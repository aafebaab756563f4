//! Durable key/value state used for the failure log and pending-resync lists.

mod file;
mod in_memory;

use serde_json::Value;

use crate::error::StateError;

pub use file::FileStateStore;
pub use in_memory::InMemoryStateStore;

/// A small persisted key/value store.
///
/// Atomicity of a single `set` is the store's responsibility; callers do
/// read-modify-write without extra locking.
pub trait StateStore: Send + Sync {
    /// Value under `key`, or `default` when unset.
    fn get(&self, key: &str, default: Value) -> Result<Value, StateError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StateError>;

    fn delete(&self, key: &str) -> Result<(), StateError>;
}
