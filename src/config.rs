//! Configuration for the registry sync engine.
//!
//! # Example
//!
//! ```
//! use registry_sync::SyncConfig;
//!
//! let config = SyncConfig::default();
//! assert_eq!(config.not_found_code, 99);
//!
//! let config = SyncConfig::from_toml_str(r#"
//!     base_url = "https://registry.example.org/api/"
//!     timeout_ms = 5000
//! "#).unwrap();
//! assert_eq!(config.timeout_ms, 5000);
//! assert_eq!(config.dedup_max_claims, 10_000);
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration shared by the type registry, storage engines, failure
/// recorder and queue workers.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Base URL of the remote registry (e.g. "https://registry.example.org/api/").
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout handed to the HTTP client.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Error code the registry uses to say "no data" for an identifier.
    #[serde(default = "default_not_found_code")]
    pub not_found_code: i64,

    /// Error message paired with `not_found_code`. Both must match exactly.
    #[serde(default = "default_not_found_message")]
    pub not_found_message: String,

    /// State key holding the append-only failure log.
    #[serde(default = "default_failure_state_key")]
    pub failure_state_key: String,

    /// Prefix for per-type pending-resync lists in the state store.
    #[serde(default = "default_pending_state_prefix")]
    pub pending_state_prefix: String,

    /// Message shown to end users when a remote call fails.
    #[serde(default = "default_user_failure_message")]
    pub user_failure_message: String,

    /// Upper bound on claims in a single dedup drain.
    #[serde(default = "default_dedup_max_claims")]
    pub dedup_max_claims: usize,

    /// Max jobs a resync worker processes per drain.
    #[serde(default = "default_resync_batch_size")]
    pub resync_batch_size: usize,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_not_found_code() -> i64 {
    99
}

fn default_not_found_message() -> String {
    "SyncErrorCode: 99 | No data".to_string()
}

fn default_failure_state_key() -> String {
    "registry_sync.failures".to_string()
}

fn default_pending_state_prefix() -> String {
    "registry_sync.pending".to_string()
}

fn default_user_failure_message() -> String {
    "Something went wrong while talking to the membership registry. Please contact support."
        .to_string()
}

fn default_dedup_max_claims() -> usize {
    10_000
}

fn default_resync_batch_size() -> usize {
    50
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            not_found_code: default_not_found_code(),
            not_found_message: default_not_found_message(),
            failure_state_key: default_failure_state_key(),
            pending_state_prefix: default_pending_state_prefix(),
            user_failure_message: default_user_failure_message(),
            dedup_max_claims: default_dedup_max_claims(),
            resync_batch_size: default_resync_batch_size(),
        }
    }
}

impl SyncConfig {
    /// Parse a config from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
