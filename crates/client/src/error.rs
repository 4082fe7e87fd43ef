//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed and was not recovered by a refresh
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The refresh call failed and the session was terminated
    #[error("Session refresh failed: {0}")]
    RefreshFailed(Box<ClientError>),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Payload rejected before dispatch
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credential storage failure
    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised by credential stores
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt credential file {path}: {source}")]
    Encoding {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Credential store lock poisoned")]
    Poisoned,
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status carried by the error, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::RefreshFailed(inner) => inner.status(),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body for errors that came back from the backend
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::BadRequest(m)
            | Self::AuthenticationFailed(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::ServerError { message: m, .. } => Some(m),
            _ => None,
        }
    }

    /// True for a 401 that reached the caller
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// True when the client erased the credentials and redirected to login
    pub fn is_session_terminated(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }

    /// Human-readable message for display.
    ///
    /// Backend error bodies are JSON such as `{"detail": "..."}`,
    /// `{"error": "..."}` or field errors like `{"name": ["..."]}`. The first
    /// usable message is returned; anything else falls back to the raw body
    /// or the error's `Display` output.
    pub fn detail(&self) -> String {
        let Some(body) = self.body() else {
            return self.to_string();
        };

        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => extract_detail(&value).unwrap_or_else(|| body.to_string()),
            Err(_) if body.trim().is_empty() => self.to_string(),
            Err(_) => body.to_string(),
        }
    }
}

fn extract_detail(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(extract_detail),
        Value::Object(map) => {
            for key in ["detail", "error", "non_field_errors"] {
                if let Some(found) = map.get(key).and_then(extract_detail) {
                    return Some(found);
                }
            }
            map.iter().find_map(|(field, v)| {
                extract_detail(v).map(|message| format!("{field}: {message}"))
            })
        }
        _ => None,
    }
}
