//! Error types for the funder data pipeline.
//!
//! Only failures that change what the caller can do are modelled here. A
//! malformed dataset line is not one of them: it is reported to the decoder's
//! handler as a [`ParseFailure`](crate::decoder::ParseFailure) and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the funder library.
#[derive(Debug, Error)]
pub enum FunderError {
    // Dataset acquisition errors
    #[error("Failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        /// HTTP status code, when the server answered at all.
        status: Option<u16>,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    // Persistent cache errors
    #[error("Persistent storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for funder operations.
pub type Result<T> = std::result::Result<T, FunderError>;

// Conversion implementations for common error types

impl From<std::io::Error> for FunderError {
    fn from(err: std::io::Error) -> Self {
        FunderError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for FunderError {
    fn from(err: serde_json::Error) -> Self {
        FunderError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for FunderError {
    fn from(err: rusqlite::Error) -> Self {
        FunderError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for FunderError {
    fn from(err: reqwest::Error) -> Self {
        match err.url() {
            Some(url) => FunderError::Fetch {
                url: url.to_string(),
                message: err.to_string(),
                status: err.status().map(|s| s.as_u16()),
            },
            None => FunderError::Network {
                message: err.to_string(),
                cause: Some(err.to_string()),
            },
        }
    }
}

impl FunderError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FunderError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a storage-unavailable error from any displayable cause.
    pub fn storage(message: impl std::fmt::Display) -> Self {
        FunderError::StorageUnavailable {
            message: message.to_string(),
        }
    }

    /// Whether this error ends an ingestion run.
    ///
    /// Fetch and stream failures are fatal; storage failures only disable the
    /// cache for the session.
    pub fn is_fatal_to_ingestion(&self) -> bool {
        !self.is_storage_error()
    }

    /// Whether this error originated in the persistent cache layer.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            FunderError::StorageUnavailable { .. } | FunderError::Database { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FunderError::Fetch {
            url: "http://localhost/funders.jsonl".into(),
            message: "404 Not Found".into(),
            status: Some(404),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch http://localhost/funders.jsonl: 404 Not Found"
        );
    }

    #[test]
    fn test_storage_errors_are_not_fatal() {
        assert!(!FunderError::storage("quota exceeded").is_fatal_to_ingestion());
        assert!(FunderError::storage("denied").is_storage_error());
        assert!(FunderError::Database {
            message: "locked".into(),
            source: None
        }
        .is_storage_error());
    }

    #[test]
    fn test_fetch_errors_are_fatal() {
        let err = FunderError::Network {
            message: "connection refused".into(),
            cause: None,
        };
        assert!(err.is_fatal_to_ingestion());
        assert!(!err.is_storage_error());
    }
}
