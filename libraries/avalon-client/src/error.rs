//! Error types for the Avalon client.

use thiserror::Error;

/// Errors that can occur when interacting with an Avalon instance.
#[derive(Error, Debug)]
pub enum AvalonClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The API key was rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Invalid instance URL
    #[error("Invalid Avalon URL: {0}")]
    InvalidUrl(String),

    /// No API key configured for the instance
    #[error("No API key configured")]
    MissingApiKey,

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Local file not found for upload
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// IO error while reading a local file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied argument was rejected before any request was made
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File type cannot be uploaded as the requested kind
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Caption file failed WebVTT validation
    #[error("Invalid captions in {path}: {reason}")]
    InvalidCaptions { path: String, reason: String },

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Rate limited by server
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

impl AvalonClientError {
    /// Classify a transport error, separating unreachable hosts from other failures.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AvalonClientError::ServerUnreachable(err.to_string())
        } else {
            AvalonClientError::Request(err)
        }
    }
}

/// Result type for Avalon client operations.
pub type Result<T> = std::result::Result<T, AvalonClientError>;
