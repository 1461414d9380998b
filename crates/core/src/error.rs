//! Error conventions shared across the workspace

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors raised by core facilities (credential storage, paths)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum CoreError {
    #[error("credential storage failed: {message}")]
    Storage { message: String },

    #[error("malformed stored session: {message}")]
    Corrupt { message: String },

    #[error("no data directory available on this platform")]
    NoDataDir,
}

impl CoreError {
    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a corrupt-session error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt(err.to_string())
    }
}
