//! Transport - the HTTP boundary to the remote registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                StorageEngine<R>                       │
//! │  resolves one `Dispatch` per Operation at build time  │
//! └──────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                 RemoteClient trait                    │
//! │        get / post / put / patch / delete              │
//! └──────────────────────────────────────────────────────┘
//!          │                               │
//!          ▼                               ▼
//! ┌─────────────────┐            ┌─────────────────────┐
//! │  InMemoryRemote │            │   HttpRemoteClient  │
//! │   (included)    │            │  (feature = "http") │
//! └─────────────────┘            └─────────────────────┘
//! ```

mod in_memory;
mod response;

#[cfg(feature = "http")]
mod http;

use thiserror::Error;

use crate::record::HttpVerb;

pub use in_memory::{InMemoryRemote, RecordedRequest, Reply};
pub use response::{classify_status, interpret, RemoteErrorKind, RemoteFailure};

#[cfg(feature = "http")]
pub use http::HttpRemoteClient;

/// A request against one registry endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRequest {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

impl RemoteRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>, content_type: &'static str) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type);
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Endpoint plus query string, unencoded. Used for diagnostics only.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.endpoint.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}?{}", self.endpoint, query.join("&"))
    }
}

/// Raw registry response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response carrying a JSON body.
    pub fn ok_json(value: serde_json::Value) -> Self {
        Self::json(200, value)
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    /// Structured registry error `{code, message}`.
    pub fn registry_error(status: u16, code: i64, message: &str) -> Self {
        Self::json(
            status,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where a request is actually sent; recorded alongside failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTarget {
    pub uri: String,
    pub host: String,
}

/// The client could not complete a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("no registry client configured: {0}")]
    Unconfigured(String),
    #[error("invalid registry request: {0}")]
    InvalidRequest(String),
    #[error("could not connect to registry: {0}")]
    Connect(String),
    #[error("registry request timed out after {0} ms")]
    Timeout(u64),
    #[error("registry transport error: {0}")]
    Other(String),
}

/// Blocking client for the remote registry, one method per verb.
pub trait RemoteClient: Send + Sync {
    fn get(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError>;

    fn post(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError>;

    fn put(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError>;

    fn patch(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError>;

    fn delete(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError>;

    fn describe(&self, request: &RemoteRequest) -> RequestTarget {
        RequestTarget {
            uri: request.path_and_query(),
            host: String::new(),
        }
    }
}

/// A verb bound to its client method.
pub type Dispatch = fn(&dyn RemoteClient, &RemoteRequest) -> Result<RemoteResponse, TransportError>;

fn dispatch_get(client: &dyn RemoteClient, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
    client.get(request)
}

fn dispatch_post(client: &dyn RemoteClient, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
    client.post(request)
}

fn dispatch_put(client: &dyn RemoteClient, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
    client.put(request)
}

fn dispatch_patch(client: &dyn RemoteClient, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
    client.patch(request)
}

fn dispatch_delete(client: &dyn RemoteClient, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
    client.delete(request)
}

/// Resolve the client method for a verb.
pub fn dispatch_for(verb: HttpVerb) -> Dispatch {
    match verb {
        HttpVerb::Get => dispatch_get,
        HttpVerb::Post => dispatch_post,
        HttpVerb::Put => dispatch_put,
        HttpVerb::Patch => dispatch_patch,
        HttpVerb::Delete => dispatch_delete,
    }
}
