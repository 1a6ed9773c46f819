//! Error types for RateWatch.

use thiserror::Error;

/// Main error type for RateWatch operations.
#[derive(Error, Debug)]
pub enum RateWatchError {
    /// A caller-supplied value could not be used.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl RateWatchError {
    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            RateWatchError::InvalidInput { .. } => "INVALID_INPUT",
            RateWatchError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Field that caused the error, if known.
    pub fn field(&self) -> Option<&str> {
        match self {
            RateWatchError::InvalidInput { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for RateWatch operations.
pub type Result<T> = std::result::Result<T, RateWatchError>;
