/// Result of `StorageEngine::save`. Remote failures are reported here, not
/// as errors, so callers must check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Created remotely; carries the registry-assigned identifier.
    Created(String),
    /// Created remotely, but the registry did not return an identifier.
    Succeeded,
    Updated,
    Failed,
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SaveOutcome::Failed)
    }

    pub fn created_identifier(&self) -> Option<&str> {
        match self {
            SaveOutcome::Created(id) => Some(id),
            _ => None,
        }
    }
}

/// Result of `StorageEngine::delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    /// Records without an identifier; nothing was sent for them.
    pub skipped: usize,
}

impl DeleteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of a forced single-record refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh<R> {
    Loaded(R),
    /// The registry reported "no data"; any local mirror was retired.
    Missing,
    /// The call failed and was recorded.
    Failed,
}

impl<R> Refresh<R> {
    pub fn into_record(self) -> Option<R> {
        match self {
            Refresh::Loaded(record) => Some(record),
            _ => None,
        }
    }
}
