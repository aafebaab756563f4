use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Status,
    Warning,
}

/// A message shown to the end user.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub key: Option<String>,
    pub text: String,
}

/// User-facing messaging channel.
pub trait Messenger: Send + Sync {
    /// Show a warning. Repeated warnings with the same key collapse to one.
    fn warning(&self, key: &str, text: &str);

    fn status(&self, text: &str);
}

#[derive(Default)]
struct MessengerState {
    notices: Vec<Notice>,
    seen: HashSet<String>,
}

/// Collects notices for the current request.
#[derive(Default)]
pub struct InMemoryMessenger {
    state: Mutex<MessengerState>,
}

impl InMemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .notices
            .clone()
    }

    pub fn warnings(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Warning)
            .collect()
    }

    /// Drop all notices and forget seen keys, starting a new request.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.notices.clear();
        state.seen.clear();
    }
}

impl Messenger for InMemoryMessenger {
    fn warning(&self, key: &str, text: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.seen.insert(key.to_string()) {
            return;
        }
        state.notices.push(Notice {
            level: NoticeLevel::Warning,
            key: Some(key.to_string()),
            text: text.to_string(),
        });
    }

    fn status(&self, text: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.notices.push(Notice {
            level: NoticeLevel::Status,
            key: None,
            text: text.to_string(),
        });
    }
}

#[cfg(feature = "emitter")]
pub use emitter::EmitterMessenger;

#[cfg(feature = "emitter")]
mod emitter {
    use std::collections::HashSet;
    use std::sync::{Mutex, PoisonError};

    use super::{Messenger, Notice, NoticeLevel};
    use crate::EventEmitter;

    /// Messenger that re-emits notices on an `EventEmitter`.
    ///
    /// Warnings go out as `registry.warning`, statuses as `registry.status`,
    /// each carrying a [`Notice`]. Listener threads are joined before
    /// returning.
    pub struct EmitterMessenger {
        emitter: Mutex<EventEmitter>,
        seen: Mutex<HashSet<String>>,
    }

    impl EmitterMessenger {
        pub const WARNING_EVENT: &'static str = "registry.warning";
        pub const STATUS_EVENT: &'static str = "registry.status";

        pub fn new(emitter: EventEmitter) -> Self {
            Self {
                emitter: Mutex::new(emitter),
                seen: Mutex::new(HashSet::new()),
            }
        }

        pub fn clear(&self) {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }

        fn emit(&self, event: &str, notice: Notice) {
            let handles = self
                .emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .emit(event, notice);
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    impl Messenger for EmitterMessenger {
        fn warning(&self, key: &str, text: &str) {
            let first = self
                .seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_string());
            if first {
                self.emit(
                    Self::WARNING_EVENT,
                    Notice {
                        level: NoticeLevel::Warning,
                        key: Some(key.to_string()),
                        text: text.to_string(),
                    },
                );
            }
        }

        fn status(&self, text: &str) {
            self.emit(
                Self::STATUS_EVENT,
                Notice {
                    level: NoticeLevel::Status,
                    key: None,
                    text: text.to_string(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_collapse_by_key() {
        let messenger = InMemoryMessenger::new();
        messenger.warning("entity.ac100", "Something went wrong.");
        messenger.warning("entity.ac100", "Something went wrong.");
        messenger.warning("entity.ac200", "Something went wrong.");
        messenger.status("Saved.");

        assert_eq!(messenger.warnings().len(), 2);
        assert_eq!(messenger.notices().len(), 3);

        messenger.clear();
        messenger.warning("entity.ac100", "Something went wrong.");
        assert_eq!(messenger.warnings().len(), 1);
    }

    #[cfg(feature = "emitter")]
    #[test]
    fn emitter_messenger_fires_listeners_once_per_key() {
        use crate::EventEmitter;
        use std::sync::{Arc, Mutex};

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let mut emitter = EventEmitter::new();
        emitter.on(EmitterMessenger::WARNING_EVENT, move |notice: Notice| {
            sink.lock().unwrap().push(notice);
        });

        let messenger = EmitterMessenger::new(emitter);
        messenger.warning("entity.ac100", "Something went wrong.");
        messenger.warning("entity.ac100", "Something went wrong.");

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].key.as_deref(), Some("entity.ac100"));
    }
}
