//! Records - typed local mirrors of remote registry rows.
//!
//! A record type derives `Serialize`/`Deserialize` for its registry fields,
//! embeds a [`RecordMeta`] (skipped by serde) for identity, and supplies a
//! [`TypeDescriptor`] describing how it maps onto the registry.
//!
//! ## Example
//!
//! ```
//! use registry_sync::{Record, RecordMeta, TypeDescriptor};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize)]
//! struct Firm {
//!     #[serde(skip)]
//!     meta: RecordMeta,
//!     firm: String,
//!     name: String,
//! }
//!
//! impl Record for Firm {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::new("firms").with_id_key("firm")
//!     }
//!     fn meta(&self) -> &RecordMeta { &self.meta }
//!     fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
//! }
//!
//! let mut firm = Firm::default();
//! assert!(firm.is_new());
//! firm.set_identifier(" AC100 ");
//! assert_eq!(firm.normalize_identifier(), Some("ac100"));
//! assert!(!firm.is_new());
//! ```

mod descriptor;
mod hooks;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub use descriptor::{Format, HttpVerb, Operation, TypeDescriptor};
pub use hooks::{NoHooks, RecordHooks};

/// Lower-case and trim a raw identifier.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Identity state shared by every record type.
///
/// The identifier is either absent or a non-empty string; setting an
/// empty or whitespace-only value clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMeta {
    identifier: Option<String>,
    forced_new: bool,
}

impl RecordMeta {
    pub fn with_identifier(id: impl Into<String>) -> Self {
        let mut meta = Self::default();
        meta.set_identifier(id);
        meta
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn set_identifier(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.identifier = if id.trim().is_empty() { None } else { Some(id) };
    }

    pub fn clear_identifier(&mut self) {
        self.identifier = None;
    }

    pub fn is_forced_new(&self) -> bool {
        self.forced_new
    }

    pub fn set_forced_new(&mut self, flag: bool) {
        self.forced_new = flag;
    }
}

/// Contract every mirrored record type implements.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// How this type maps onto the remote registry.
    fn descriptor() -> TypeDescriptor;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn identifier(&self) -> Option<&str> {
        self.meta().identifier()
    }

    fn set_identifier(&mut self, id: impl Into<String>) {
        self.meta_mut().set_identifier(id);
    }

    /// Normalize the identifier in place and return it.
    fn normalize_identifier(&mut self) -> Option<&str> {
        let normalized = self.identifier().map(normalize_identifier);
        if let Some(id) = normalized {
            self.meta_mut().set_identifier(id);
        }
        self.identifier()
    }

    /// True when there is no identifier or the new flag was forced.
    fn is_new(&self) -> bool {
        self.identifier().is_none() || self.meta().is_forced_new()
    }

    /// Mark the record as new even if it carries a pre-assigned identifier.
    fn force_new(&mut self, flag: bool) {
        self.meta_mut().set_forced_new(flag);
    }

    /// All attributes as an ordered map, as sent to the registry.
    fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Build a record from registry attributes. Identity is not set here.
    fn from_map(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }
}
