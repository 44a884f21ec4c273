//! Error types for the model crate.

use thiserror::Error;

/// Result type alias using the model error type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Error type for model operations.
///
/// These errors never cross the [`crate::ModelClient`] trait surface: the
/// trait methods absorb them into failure-flagged results or apologetic
/// strings. They are visible to callers only during client construction.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Backend/API error from the provider.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Network/connectivity error.
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (API key missing, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Local I/O error (image file unreadable, etc.).
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ModelError::Network(format!("Connection failed: {}", err))
        } else {
            ModelError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: ModelError = io.into();
        assert!(matches!(err, ModelError::Io(_)));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ModelError = serde_err.into();
        assert!(matches!(err, ModelError::Serialization(_)));
    }
}
