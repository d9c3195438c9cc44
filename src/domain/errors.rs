//! Domain error types
//!
//! This module defines the error hierarchy for issue-mirror.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main issue-mirror error type
///
/// Every fatal condition of a run ends up here. Lookup misses and unknown
/// binary types are not errors and never surface as a variant.
#[derive(Debug, Clone, Error)]
pub enum MirrorError {
    /// Configuration-related errors (missing or invalid settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// GitHub REST API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Attachment download failed (non-2xx or transport failure)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Image decoding, transform or encoding failed
    #[error("Media error: {0}")]
    Media(String),

    /// Object store failures that are not retried
    #[error("Store error: {0}")]
    Store(String),

    /// The target repository is archived and refuses writes
    #[error("Repository {0} is archived")]
    Archived(String),

    /// A retried write ran out of attempts
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: usize, last_error: String },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl MirrorError {
    /// Returns true for errors caused by missing or invalid configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, MirrorError::Configuration(_))
    }

    /// Returns true if this error is a GitHub 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, MirrorError::GitHub(GitHubError::NotFound(_)))
    }
}

/// GitHub-specific errors
///
/// Errors that occur when talking to the GitHub REST API.
/// These errors don't expose the HTTP client's types.
#[derive(Debug, Clone, Error)]
pub enum GitHubError {
    /// Failed to reach the API
    #[error("Failed to connect to GitHub: {0}")]
    ConnectionFailed(String),

    /// Resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid or unexpected response body
    #[error("Invalid response from GitHub: {0}")]
    InvalidResponse(String),

    /// Client error (4xx other than 404)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },
}

impl GitHubError {
    /// Builds the error matching an unsuccessful HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => GitHubError::NotFound(message),
            500..=599 => GitHubError::ServerError { status, message },
            _ => GitHubError::ClientError { status, message },
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> Self {
        MirrorError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        MirrorError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MirrorError {
    fn from(err: toml::de::Error) -> Self {
        MirrorError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<image::ImageError> for MirrorError {
    fn from(err: image::ImageError) -> Self {
        MirrorError::Media(err.to_string())
    }
}
