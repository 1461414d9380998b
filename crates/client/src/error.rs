//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status other than 401
    #[error("Server error {status}: {message}")]
    Api { status: u16, message: String },

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A request received 401 again after a successful token refresh
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Token refresh failed; the session has been torn down
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credential storage failure
    #[error("Credential storage error: {0}")]
    Storage(#[from] atelier_core::CoreError),
}

impl ClientError {
    /// Create error from a non-success HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Failure of a refresh cycle, shared with every queued request
///
/// Kept `Clone` so a single settlement can reject all waiters with the same
/// cause.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RefreshError {
    message: String,
}

impl RefreshError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
