use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::{LockError, LockManager};
use crate::record::normalize_identifier;

type HeldSet = Arc<Mutex<HashSet<String>>>;

/// Process-local identifier locks: a set of held identifiers.
#[derive(Default)]
pub struct InMemoryLockManager {
    held: HeldSet,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, identifier: &str) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&normalize_identifier(identifier))
    }
}

impl LockManager for InMemoryLockManager {
    type Guard = IdentifierGuard;

    fn try_acquire(&self, identifier: &str) -> Result<Option<IdentifierGuard>, LockError> {
        let identifier = normalize_identifier(identifier);
        let mut held = self.held.lock().map_err(|_| LockError::Poisoned)?;
        if !held.insert(identifier.clone()) {
            return Ok(None);
        }
        Ok(Some(IdentifierGuard {
            identifier,
            held: Arc::clone(&self.held),
        }))
    }
}

/// Holds one identifier until dropped.
#[derive(Debug)]
pub struct IdentifierGuard {
    identifier: String,
    held: HeldSet,
}

impl IdentifierGuard {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Drop for IdentifierGuard {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.identifier);
    }
}
