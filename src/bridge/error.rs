//! Error types for the page automation bridge.

use thiserror::Error;

/// Failures of individual bridge calls, tagged by the operation that failed.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("observation failed: {0}")]
    Observation(String),

    #[error("action failed: {0}")]
    Action(String),

    #[error("file upload failed: {0}")]
    Upload(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
