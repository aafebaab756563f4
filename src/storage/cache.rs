use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-process identifier -> record cache for one storage engine.
///
/// Never persisted. A poisoned lock is recovered rather than reported since
/// the worst outcome is a stale or missing entry.
pub(crate) struct RecordCache<R> {
    entries: RwLock<HashMap<String, R>>,
}

impl<R: Clone> RecordCache<R> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Split `ids` into cached records and the ids still to fetch.
    pub(crate) fn partition(&self, ids: &[String]) -> (HashMap<String, R>, Vec<String>) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut hits = HashMap::new();
        let mut misses = Vec::new();
        for id in ids {
            match entries.get(id) {
                Some(record) => {
                    hits.insert(id.clone(), record.clone());
                }
                None => misses.push(id.clone()),
            }
        }
        (hits, misses)
    }

    pub(crate) fn insert(&self, id: String, record: R) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, record);
    }

    pub(crate) fn remove<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for id in ids {
            entries.remove(id);
        }
    }

    pub(crate) fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
