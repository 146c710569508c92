//! API Error Types
//!
//! Normalised failures returned by `ApiClient`. Every variant that comes from
//! an HTTP response keeps the status and the parsed body so callers can
//! inspect them programmatically.

use atlus_core::CoreError;
use serde_json::Value;
use thiserror::Error;

/// Message used when a 401 body carries neither `error` nor `msg`.
pub const DEFAULT_UNAUTHORIZED_MESSAGE: &str = "Please log in again.";

/// Error type for API requests.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network request failed: {message}")]
    Transport { message: String },

    /// The server rejected the session (HTTP 401). The session token has
    /// already been cleared when this is returned.
    #[error("{message}")]
    Unauthorized { message: String, body: Value },

    /// Any other non-2xx response.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Value,
    },

    /// A successful response did not match the expected shape.
    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    /// The request could not be built (e.g. body serialization failed).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Storage or configuration failure surfaced by the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn decode(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed response body carried by this error, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Unauthorized { body, .. } | Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `error` first, then `msg`. Empty strings, `null` and `false`
/// count as absent; other non-string values are rendered as JSON text.
pub fn body_message(body: &Value) -> Option<String> {
    field_message(body, "error").or_else(|| field_message(body, "msg"))
}

/// Message from the `error` field only. The auth endpoints never report
/// through `msg`.
pub fn error_field(body: &Value) -> Option<String> {
    field_message(body, "error")
}

fn field_message(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
