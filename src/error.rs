use thiserror::Error;

use crate::record::Operation;

/// A record type's descriptor lacks the endpoint or key an operation needs.
///
/// Storage engines return this instead of issuing a request so that batch
/// callers working over heterogeneous record types can tell a misconfigured
/// type apart from a legitimately empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record type `{type_name}` has no {missing} configured for {operation}")]
pub struct MappingIncomplete {
    pub type_name: String,
    pub operation: Operation,
    pub missing: &'static str,
}

impl MappingIncomplete {
    pub fn new(type_name: impl Into<String>, operation: Operation, missing: &'static str) -> Self {
        Self {
            type_name: type_name.into(),
            operation,
            missing,
        }
    }
}

/// Errors raised by a durable key/value state store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state store lock poisoned during {0}")]
    Poisoned(&'static str),
    #[error("state store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("state value under `{key}` has unexpected shape: {reason}")]
    Shape { key: String, reason: String },
}

/// Programmer errors raised by the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("record type name must not be empty")]
    EmptyTypeName,
    #[error("type name `{type_name}` is already bound to record type {bound}")]
    TypeMismatch { type_name: String, bound: String },
    #[error("registry lock poisoned")]
    Poisoned,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid sync configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
