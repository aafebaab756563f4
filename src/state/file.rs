use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use super::StateStore;
use crate::error::StateError;

/// State store persisted as a single JSON document.
///
/// Writes go to a sibling temp file that is renamed over the document, so a
/// crash mid-write leaves the previous state intact.
pub struct FileStateStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, StateError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(StateError::Shape {
                key: self.path.display().to_string(),
                reason: format!("expected an object, found {}", type_name(&other)),
            }),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<(), StateError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, operation: &'static str, mutate: F) -> Result<(), StateError>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let _held = self.guard.lock().map_err(|_| StateError::Poisoned(operation))?;
        let mut document = self.read_document()?;
        mutate(&mut document);
        self.write_document(&document)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str, default: Value) -> Result<Value, StateError> {
        let _held = self.guard.lock().map_err(|_| StateError::Poisoned("get"))?;
        Ok(self.read_document()?.remove(key).unwrap_or(default))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        self.update("set", |document| {
            document.insert(key.to_string(), value);
        })
    }

    fn delete(&self, key: &str) -> Result<(), StateError> {
        self.update("delete", |document| {
            document.remove(key);
        })
    }
}
