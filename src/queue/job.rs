use serde::{Deserialize, Serialize};

use crate::record::normalize_identifier;

/// Request to re-synchronize one external identifier.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct SyncJob {
    pub external_id: Option<String>,
    pub change_marker: Option<String>,
}

impl SyncJob {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            change_marker: None,
        }
    }

    pub fn with_change_marker(mut self, marker: impl Into<String>) -> Self {
        self.change_marker = Some(marker.into());
        self
    }

    /// Normalized identifier, or `None` when the job carries none.
    pub fn dedup_key(&self) -> Option<String> {
        self.external_id
            .as_deref()
            .map(normalize_identifier)
            .filter(|id| !id.is_empty())
    }
}

/// A job claimed from a queue, with the handle needed to delete or release it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimedJob {
    pub item_id: u64,
    pub job: SyncJob,
}
