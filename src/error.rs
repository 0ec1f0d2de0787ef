//! Error types for Storyloop
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Storyloop operations
///
/// This enum encompasses the errors that can occur while loading
/// configuration, talking to the chat endpoints, and estimating cost.
#[derive(Error, Debug)]
pub enum StoryloopError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The endpoint answered, but with a non-success status
    ///
    /// Transport success and application success are kept apart so the
    /// caller can tell "the request never arrived" from "the server said no".
    #[error("{operation} returned status {status}: {body}")]
    Status {
        /// Lifecycle operation that failed (create, send, delete)
        operation: &'static str,
        /// HTTP status code returned by the server
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Tokenizer construction errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Invalid endpoint or cookie URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Storyloop operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
