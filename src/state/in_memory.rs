use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::StateStore;
use crate::error::StateError;

/// In-memory state store backed by a HashMap. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        match self.values.read() {
            Ok(values) => values.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &str, default: Value) -> Result<Value, StateError> {
        let values = self
            .values
            .read()
            .map_err(|_| StateError::Poisoned("get"))?;
        Ok(values.get(key).cloned().unwrap_or(default))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StateError::Poisoned("set"))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StateError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StateError::Poisoned("delete"))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_default_when_unset() {
        let store = InMemoryStateStore::new();
        assert_eq!(store.get("missing", json!([])).unwrap(), json!([]));
    }

    #[test]
    fn set_then_get_and_delete() {
        let store = InMemoryStateStore::new();
        store.set("k", json!({"a": 1})).unwrap();
        assert_eq!(store.get("k", Value::Null).unwrap(), json!({"a": 1}));

        let shared = store.clone();
        shared.delete("k").unwrap();
        assert_eq!(store.get("k", Value::Null).unwrap(), Value::Null);
        assert!(store.keys().is_empty());
    }
}
