use std::sync::Arc;

use tracing::{error, warn};

use super::{FailureLog, FailureRecord, Messenger, StateFailureLog};
use crate::config::SyncConfig;
use crate::error::StateError;
use crate::state::StateStore;

/// Captures failed registry calls for operators and warns the end user.
///
/// The exact remote error text only reaches the durable log and the
/// general log; the user sees the configured generic message.
pub struct FailureRecorder {
    log: Arc<dyn FailureLog>,
    messenger: Arc<dyn Messenger>,
    user_message: String,
}

impl FailureRecorder {
    pub fn new(log: Arc<dyn FailureLog>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            log,
            messenger,
            user_message: SyncConfig::default().user_failure_message,
        }
    }

    /// Recorder writing to `config.failure_state_key` in `store`.
    pub fn from_config(
        config: &SyncConfig,
        store: Arc<dyn StateStore>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            log: Arc::new(StateFailureLog::new(store, config.failure_state_key.clone())),
            messenger,
            user_message: config.user_failure_message.clone(),
        }
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = message.into();
        self
    }

    pub fn record(&self, failure: FailureRecord) {
        warn!(
            operation = failure.operation.label(),
            endpoint = %failure.endpoint,
            identifier = %failure.identifier,
            code = failure.error_code,
            "{}",
            failure.summary()
        );

        let key = format!("entity.{}", failure.identifier);
        if let Err(err) = self.log.append(failure) {
            error!(error = %err, "could not append to the registry failure log");
        }
        self.messenger.warning(&key, &self.user_message);
    }

    pub fn entries(&self) -> Result<Vec<FailureRecord>, StateError> {
        self.log.entries()
    }
}
