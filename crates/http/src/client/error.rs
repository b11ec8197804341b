//! Client error types

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Body of a non-success response, kept both raw and parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    raw: String,
    json: Option<Value>,
}

impl ErrorBody {
    /// Build from the raw response bytes, parsing JSON when possible
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            raw: String::from_utf8_lossy(bytes).into_owned(),
            json: serde_json::from_slice(bytes).ok(),
        }
    }

    /// Raw body text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed JSON body, if the server sent JSON
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// The `detail` message most API errors carry
    pub fn detail(&self) -> Option<&str> {
        self.json.as_ref()?.get("detail")?.as_str()
    }

    /// Field-level validation messages for `field`
    ///
    /// Validation failures come back as `{"field": ["message", ...]}`.
    pub fn field_errors(&self, field: &str) -> Vec<&str> {
        match self.json.as_ref().and_then(|json| json.get(field)) {
            Some(Value::Array(messages)) => messages.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(message)) => vec![message.as_str()],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(detail) = self.detail() {
            f.write_str(detail)
        } else if self.raw.is_empty() {
            f.write_str("<empty body>")
        } else {
            f.write_str(&self.raw)
        }
    }
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Bad request, usually a validation failure
    #[error("Bad request: {0}")]
    BadRequest(ErrorBody),

    /// Authentication failed or the access credential expired
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(ErrorBody),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(ErrorBody),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: ErrorBody },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, body: ErrorBody) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(body),
            401 => Self::AuthenticationFailed(body),
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            status => Self::Status { status, body },
        }
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            Self::Serialization(_) | Self::Configuration(_) => None,
        }
    }

    /// Parsed error body, if the server answered
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::BadRequest(body)
            | Self::AuthenticationFailed(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether this is the authorization failure that drives a session refresh
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Whether the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// Message suitable for showing to a user: the server's `detail`, else the error itself
    pub fn user_message(&self) -> String {
        self.body()
            .and_then(ErrorBody::detail)
            .map_or_else(|| self.to_string(), ToOwned::to_owned)
    }
}
