use std::sync::Arc;

use serde_json::Value;

use super::FailureRecord;
use crate::error::StateError;
use crate::state::StateStore;

/// Append-only log of failure records. Entries are never rewritten.
pub trait FailureLog: Send + Sync {
    fn append(&self, record: FailureRecord) -> Result<(), StateError>;

    /// All entries, oldest first.
    fn entries(&self) -> Result<Vec<FailureRecord>, StateError>;
}

/// Failure log kept as a JSON list under one key of a state store.
#[derive(Clone)]
pub struct StateFailureLog {
    store: Arc<dyn StateStore>,
    key: String,
}

impl StateFailureLog {
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn list(&self) -> Result<Vec<Value>, StateError> {
        match self.store.get(&self.key, Value::Array(Vec::new()))? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            _ => Err(StateError::Shape {
                key: self.key.clone(),
                reason: "failure log is not a list".into(),
            }),
        }
    }
}

impl FailureLog for StateFailureLog {
    fn append(&self, record: FailureRecord) -> Result<(), StateError> {
        let mut items = self.list()?;
        items.push(serde_json::to_value(record)?);
        self.store.set(&self.key, Value::Array(items))
    }

    fn entries(&self) -> Result<Vec<FailureRecord>, StateError> {
        self.list()?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(StateError::from))
            .collect()
    }
}
