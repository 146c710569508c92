//! Error Handling
//!
//! Unified error type for the application crate.
//! Uses thiserror for ergonomic error definitions.

use atlus_api::ApiError;
use atlus_core::CoreError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Errors from the HTTP API layer, including session expiry
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session storage and model errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True when the server rejected the session token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api(e) if e.is_unauthorized())
    }
}

/// Convert AppError to a string for display at the command line
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
