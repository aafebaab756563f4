//! Record types used across the integration suites.

use std::sync::Mutex;

use registry_sync::{HttpVerb, Record, RecordHooks, RecordMeta, TypeDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A member firm with the full set of registry operations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    #[serde(skip)]
    pub meta: RecordMeta,
    #[serde(default)]
    pub firm: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl Firm {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn existing(id: &str, name: &str) -> Self {
        Self {
            meta: RecordMeta::with_identifier(id),
            firm: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl Record for Firm {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("firms")
            .with_id_key("firm")
            .with_create("firms/new", HttpVerb::Post)
            .with_update("firms", HttpVerb::Put)
            .with_lookup("firms/search", "firm")
            .with_delete("firms", HttpVerb::Delete)
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// A person: read, create and update only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(skip)]
    pub meta: RecordMeta,
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub email: String,
}

impl Record for Person {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("people").with_id_key("person")
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Hooks that log every call, in order.
#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<String>>,
    retired: Mutex<Vec<String>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn retired(&self) -> Vec<String> {
        self.retired.lock().unwrap().clone()
    }

    fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl RecordHooks<Firm> for RecordingHooks {
    fn before_create(&self, values: &mut Map<String, Value>) {
        values
            .entry("status")
            .or_insert_with(|| Value::from("active"));
        self.push("before_create");
    }

    fn after_create(&self, _record: &mut Firm) {
        self.push("after_create");
    }

    fn before_save(&self, _record: &mut Firm) {
        self.push("before_save");
    }

    fn after_save(&self, _record: &mut Firm, was_update: bool) {
        self.push(if was_update {
            "after_save:update"
        } else {
            "after_save:create"
        });
    }

    fn before_delete(&self, records: &[Firm]) {
        self.push(format!("before_delete:{}", records.len()));
    }

    fn after_delete(&self, records: &[Firm]) {
        self.push(format!("after_delete:{}", records.len()));
    }

    fn after_load_batch(&self, records: &mut Vec<Firm>) {
        self.push(format!("after_load_batch:{}", records.len()));
    }

    fn retire_local_mirror(&self, identifier: &str) {
        self.retired.lock().unwrap().push(identifier.to_string());
    }
}
