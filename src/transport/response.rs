use serde_json::{Map, Value};

use super::{RemoteResponse, TransportError};
use crate::record::Format;

/// Domain classification of a failed registry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    RateLimited,
    Server,
    /// The round trip itself failed.
    Transport,
    /// A 2xx response whose body could not be decoded.
    Malformed,
    Unrecognized(u16),
}

impl RemoteErrorKind {
    pub fn label(&self) -> String {
        match self {
            RemoteErrorKind::BadRequest => "bad request".into(),
            RemoteErrorKind::Unauthorized => "unauthorized".into(),
            RemoteErrorKind::Forbidden => "forbidden".into(),
            RemoteErrorKind::NotFound => "not found".into(),
            RemoteErrorKind::Conflict => "conflict".into(),
            RemoteErrorKind::Unprocessable => "unprocessable".into(),
            RemoteErrorKind::RateLimited => "rate limited".into(),
            RemoteErrorKind::Server => "server error".into(),
            RemoteErrorKind::Transport => "transport".into(),
            RemoteErrorKind::Malformed => "malformed payload".into(),
            RemoteErrorKind::Unrecognized(status) => format!("unrecognized status {}", status),
        }
    }
}

/// Map an HTTP status code onto an error kind.
pub fn classify_status(status: u16) -> RemoteErrorKind {
    match status {
        400 => RemoteErrorKind::BadRequest,
        401 => RemoteErrorKind::Unauthorized,
        403 => RemoteErrorKind::Forbidden,
        404 | 410 => RemoteErrorKind::NotFound,
        409 => RemoteErrorKind::Conflict,
        422 => RemoteErrorKind::Unprocessable,
        429 => RemoteErrorKind::RateLimited,
        500..=599 => RemoteErrorKind::Server,
        other => RemoteErrorKind::Unrecognized(other),
    }
}

/// A registry call that did not produce a usable payload.
///
/// `code` and `message` are the registry's own error signature when the body
/// carried one, otherwise the HTTP status and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub kind: RemoteErrorKind,
    pub status: u16,
    pub code: i64,
    pub message: String,
}

impl RemoteFailure {
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Malformed,
            status,
            code: i64::from(status),
            message: message.into(),
        }
    }
}

impl From<TransportError> for RemoteFailure {
    fn from(err: TransportError) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            status: 0,
            code: 0,
            message: err.to_string(),
        }
    }
}

/// Registry error envelope: an object with exactly `code` and `message`.
fn error_envelope(value: &Value) -> Option<(i64, String)> {
    let map: &Map<String, Value> = value.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let code = match map.get("code")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let message = map.get("message")?.as_str()?.to_string();
    Some((code, message))
}

/// Turn a raw round-trip result into a decoded payload or a failure.
pub fn interpret(
    result: Result<RemoteResponse, TransportError>,
    format: Format,
) -> Result<Value, RemoteFailure> {
    let response = result?;
    let decoded = format.decode(&response.body);

    if !response.is_success() {
        let kind = classify_status(response.status);
        let (code, message) = decoded
            .ok()
            .as_ref()
            .and_then(error_envelope)
            .unwrap_or_else(|| (i64::from(response.status), response.body.trim().to_string()));
        return Err(RemoteFailure {
            kind,
            status: response.status,
            code,
            message,
        });
    }

    let value = decoded.map_err(|e| RemoteFailure::malformed(response.status, e.to_string()))?;
    match error_envelope(&value) {
        Some((code, message)) => Err(RemoteFailure {
            kind: RemoteErrorKind::Unrecognized(response.status),
            status: response.status,
            code,
            message,
        }),
        None => Ok(value),
    }
}
