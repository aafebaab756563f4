use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MappingIncomplete;

/// HTTP verbs the remote registry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The remote operations a storage engine performs for a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Lookup,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Lookup => "property lookup",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire format used to exchange records with the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Format {
    #[default]
    Json,
}

impl Format {
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
        }
    }

    pub fn encode(&self, map: &Map<String, Value>) -> Result<String, serde_json::Error> {
        match self {
            Format::Json => serde_json::to_string(map),
        }
    }

    /// Decode a response body. An empty body decodes to `Value::Null`.
    pub fn decode(&self, body: &str) -> Result<Value, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        match self {
            Format::Json => serde_json::from_str(body),
        }
    }
}

/// Per-type description of how a record type maps onto the remote registry.
///
/// Read, create and update endpoints fall back to the shared endpoint when a
/// type does not distinguish them. Lookup and delete have no fallback: a type
/// without them simply does not support those operations.
///
/// ```
/// use registry_sync::{HttpVerb, TypeDescriptor};
///
/// let firm = TypeDescriptor::new("firms")
///     .with_id_key("firm")
///     .with_create("firms/new", HttpVerb::Post)
///     .with_lookup("firms/search", "firm");
///
/// assert_eq!(firm.read_endpoint(), Some("firms"));
/// assert_eq!(firm.create_endpoint(), Some("firms/new"));
/// assert_eq!(firm.update_endpoint(), Some("firms"));
/// assert_ne!(firm.create_verb(), firm.update_verb());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    format: Format,
    id_key: String,
    endpoint: Option<String>,
    read_endpoint: Option<String>,
    create_endpoint: Option<String>,
    create_verb: HttpVerb,
    update_endpoint: Option<String>,
    update_verb: HttpVerb,
    lookup_endpoint: Option<String>,
    lookup_key: Option<String>,
    delete_endpoint: Option<String>,
    delete_verb: HttpVerb,
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        Self {
            format: Format::Json,
            id_key: "id".to_string(),
            endpoint: None,
            read_endpoint: None,
            create_endpoint: None,
            create_verb: HttpVerb::Post,
            update_endpoint: None,
            update_verb: HttpVerb::Put,
            lookup_endpoint: None,
            lookup_key: None,
            delete_endpoint: None,
            delete_verb: HttpVerb::Delete,
        }
    }
}

impl TypeDescriptor {
    /// Descriptor whose read, create and update calls all go to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    pub fn with_read(mut self, endpoint: impl Into<String>) -> Self {
        self.read_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_create(mut self, endpoint: impl Into<String>, verb: HttpVerb) -> Self {
        self.create_endpoint = Some(endpoint.into());
        self.create_verb = verb;
        self
    }

    pub fn with_update(mut self, endpoint: impl Into<String>, verb: HttpVerb) -> Self {
        self.update_endpoint = Some(endpoint.into());
        self.update_verb = verb;
        self
    }

    pub fn with_lookup(mut self, endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        self.lookup_endpoint = Some(endpoint.into());
        self.lookup_key = Some(key.into());
        self
    }

    /// Lookup endpoint for list queries only; single-record lookups still need a key.
    pub fn with_lookup_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.lookup_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_delete(mut self, endpoint: impl Into<String>, verb: HttpVerb) -> Self {
        self.delete_endpoint = Some(endpoint.into());
        self.delete_verb = verb;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Field carrying the identifier in registry payloads and read queries.
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    pub fn read_endpoint(&self) -> Option<&str> {
        self.read_endpoint.as_deref().or(self.endpoint.as_deref())
    }

    pub fn create_endpoint(&self) -> Option<&str> {
        self.create_endpoint.as_deref().or(self.endpoint.as_deref())
    }

    pub fn create_verb(&self) -> HttpVerb {
        self.create_verb
    }

    pub fn update_endpoint(&self) -> Option<&str> {
        self.update_endpoint.as_deref().or(self.endpoint.as_deref())
    }

    pub fn update_verb(&self) -> HttpVerb {
        self.update_verb
    }

    pub fn lookup_endpoint(&self) -> Option<&str> {
        self.lookup_endpoint.as_deref()
    }

    pub fn lookup_key(&self) -> Option<&str> {
        self.lookup_key.as_deref()
    }

    pub fn delete_endpoint(&self) -> Option<&str> {
        self.delete_endpoint.as_deref()
    }

    pub fn delete_verb(&self) -> HttpVerb {
        self.delete_verb
    }

    /// Verb used for an operation. Reads and lookups are always GET.
    pub fn verb_for(&self, operation: Operation) -> HttpVerb {
        match operation {
            Operation::Read | Operation::Lookup => HttpVerb::Get,
            Operation::Create => self.create_verb,
            Operation::Update => self.update_verb,
            Operation::Delete => self.delete_verb,
        }
    }

    pub fn endpoint_for(&self, operation: Operation) -> Option<&str> {
        match operation {
            Operation::Read => self.read_endpoint(),
            Operation::Lookup => self.lookup_endpoint(),
            Operation::Create => self.create_endpoint(),
            Operation::Update => self.update_endpoint(),
            Operation::Delete => self.delete_endpoint(),
        }
    }

    /// Endpoint for `operation`, or `MappingIncomplete` naming `type_name`.
    pub fn require_endpoint(
        &self,
        operation: Operation,
        type_name: &str,
    ) -> Result<&str, MappingIncomplete> {
        self.endpoint_for(operation)
            .ok_or_else(|| MappingIncomplete::new(type_name, operation, "endpoint"))
    }

    pub fn require_lookup_key(&self, type_name: &str) -> Result<&str, MappingIncomplete> {
        self.lookup_key()
            .ok_or_else(|| MappingIncomplete::new(type_name, Operation::Lookup, "lookup key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_endpoint_backs_read_create_update() {
        let descriptor = TypeDescriptor::new("people");
        assert_eq!(descriptor.read_endpoint(), Some("people"));
        assert_eq!(descriptor.create_endpoint(), Some("people"));
        assert_eq!(descriptor.update_endpoint(), Some("people"));
        assert_eq!(descriptor.lookup_endpoint(), None);
        assert_eq!(descriptor.delete_endpoint(), None);
    }

    #[test]
    fn create_and_update_verbs_differ_by_default() {
        let descriptor = TypeDescriptor::default();
        assert_eq!(descriptor.create_verb(), HttpVerb::Post);
        assert_eq!(descriptor.update_verb(), HttpVerb::Put);
        assert_eq!(descriptor.verb_for(Operation::Read), HttpVerb::Get);
        assert_eq!(descriptor.verb_for(Operation::Lookup), HttpVerb::Get);
    }

    #[test]
    fn missing_mapping_names_type_and_operation() {
        let descriptor = TypeDescriptor::default();
        let err = descriptor
            .require_endpoint(Operation::Read, "payment_profile")
            .unwrap_err();
        assert_eq!(err.type_name, "payment_profile");
        assert_eq!(err.operation, Operation::Read);
        assert_eq!(
            err.to_string(),
            "record type `payment_profile` has no endpoint configured for read"
        );

        let err = TypeDescriptor::new("firms")
            .with_lookup_endpoint("firms/search")
            .require_lookup_key("firm")
            .unwrap_err();
        assert_eq!(err.missing, "lookup key");
    }

    #[test]
    fn json_format_decodes_empty_body_as_null() {
        assert_eq!(Format::Json.decode("  ").unwrap(), Value::Null);
        assert!(Format::Json.decode("{not json").is_err());
    }
}
