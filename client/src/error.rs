//! Data source error types.

use thiserror::Error;

/// Errors raised while fetching rates.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// The body was not a rates payload.
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The source had nothing to return.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Check if the next scheduled refresh may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport(_) | SourceError::Unavailable(_) => true,
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::MalformedPayload(_) => false,
        }
    }
}

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let status = |status| SourceError::Status {
            status,
            endpoint: "http://localhost".to_string(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());

        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!SourceError::MalformedPayload(malformed).is_retryable());
        assert!(SourceError::Unavailable("empty".to_string()).is_retryable());
    }
}
