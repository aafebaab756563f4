use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Storage-engine operation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOperation {
    #[serde(rename = "doLoadMultiple")]
    LoadMultiple,
    #[serde(rename = "loadByProperties")]
    LoadByProperties,
    #[serde(rename = "loadMultipleByProperties")]
    LoadMultipleByProperties,
    #[serde(rename = "doSave")]
    Save,
    #[serde(rename = "doDelete")]
    Delete,
}

impl SyncOperation {
    /// Label written to the failure log.
    pub fn label(&self) -> &'static str {
        match self {
            SyncOperation::LoadMultiple => "doLoadMultiple",
            SyncOperation::LoadByProperties => "loadByProperties",
            SyncOperation::LoadMultipleByProperties => "loadMultipleByProperties",
            SyncOperation::Save => "doSave",
            SyncOperation::Delete => "doDelete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One failed registry call, as kept for operators.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct FailureRecord {
    pub operation: SyncOperation,
    pub endpoint: String,
    pub identifier: String,
    pub request_payload: String,
    pub entity_type_label: String,
    pub timestamp: SystemTime,
    pub error_message: String,
    pub error_code: i64,
    pub request_verb: String,
    pub request_uri: String,
    pub request_host: String,
}

impl FailureRecord {
    /// One-line summary for the general log.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} for {} `{}` failed with code {}: {}",
            self.operation,
            self.request_verb,
            self.request_uri,
            self.entity_type_label,
            self.identifier,
            self.error_code,
            self.error_message
        )
    }
}
