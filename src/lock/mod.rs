//! Per-identifier exclusion for resync workers.
//!
//! A worker asks for an identifier and either gets a guard or learns the
//! identifier is busy. Dropping the guard frees the identifier. Nothing
//! looks up an ambient "currently syncing" flag.

mod in_memory;

use thiserror::Error;

pub use in_memory::{IdentifierGuard, InMemoryLockManager};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock table poisoned")]
    Poisoned,
}

/// Non-blocking exclusion keyed by external identifier.
///
/// A shared backend (database advisory lock, Redis key with TTL) would sit
/// behind the same trait with a guard that releases the remote key.
pub trait LockManager: Send + Sync {
    type Guard;

    /// `Ok(None)` when another holder has the identifier.
    fn try_acquire(&self, identifier: &str) -> Result<Option<Self::Guard>, LockError>;
}
