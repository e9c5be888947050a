//! Error types for PrismWeave operations.
//!
//! This module defines the main error type [`PrismError`] which represents
//! all possible errors that can occur during capture, conversion, commit,
//! and configuration operations.
//!
//! # Example
//!
//! ```rust
//! use prismweave_core::{PrismError, Result};
//!
//! fn check_repo(repo: &str) -> Result<()> {
//!     if !repo.contains('/') {
//!         return Err(PrismError::Validation("repository must be owner/repo".into()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for capture and commit operations.
///
/// This enum represents all possible errors that can occur during content
/// capture, markdown conversion, GitHub commits, and configuration handling.
/// Content extraction itself never produces an error; malformed markup
/// degrades to a best-effort result instead.
#[derive(Error, Debug)]
pub enum PrismError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Markdown conversion errors.
    ///
    /// Returned when the underlying HTML-to-markdown converter fails.
    /// Callers must treat the capture as failed rather than committing
    /// partial output.
    #[error("Markdown conversion failed: {0}")]
    ConversionError(String),

    /// GitHub API rejected the request.
    ///
    /// Carries the HTTP status and the message body returned by the API.
    /// Rate-limit and authentication failures have their own variants so
    /// callers can distinguish them without parsing messages.
    #[error("GitHub API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// GitHub rate limit exhausted.
    ///
    /// Surfaced to the caller as-is; commits are never retried
    /// automatically.
    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    /// GitHub authentication failed.
    ///
    /// The token is missing, expired, or lacks the `contents` scope.
    #[error("GitHub authentication failed (check token and scopes)")]
    AuthError,

    /// Configuration or input validation failed.
    ///
    /// Reported synchronously from the validating function before any
    /// network call is attempted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A message with an unrecognized type was sent to a capture adapter.
    ///
    /// Unknown messages are rejected explicitly, never silently ignored.
    #[error("Unknown message type: {0}")]
    UnknownMessage(String),

    /// The adapter was asked to extract before a page was loaded.
    #[error("No page loaded in capture adapter")]
    NoPage,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    ///
    /// Wraps standard I/O errors for file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage provider errors.
    ///
    /// Returned when the settings storage backend cannot be read or written.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// JSON serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The requested article does not exist on the visualization backend.
    #[error("Article not found: {0}")]
    ArticleNotFound(String),
}

/// Result type alias for PrismError.
///
/// This is a convenience alias for `std::result::Result<T, PrismError>`.
pub type Result<T> = std::result::Result<T, PrismError>;

/// The outcome of a synchronous validation pass.
///
/// Shared by configuration validators (bookmarklet config, settings):
/// every problem is collected rather than stopping at the first, and
/// validation always completes before any network call is attempted.
#[derive(Debug, Clone)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    /// Build a validation result from collected errors.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrismError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_unknown_message_error() {
        let err = PrismError::UnknownMessage("FROBNICATE".to_string());
        assert!(err.to_string().contains("Unknown message type"));
        assert!(err.to_string().contains("FROBNICATE"));
    }

    #[test]
    fn test_api_error_carries_status() {
        let err = PrismError::ApiError { status: 422, message: "Invalid request".to_string() };
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("Invalid request"));
    }

    #[test]
    fn test_timeout_error() {
        let err = PrismError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }
}
