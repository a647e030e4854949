//! Error types for remote browser sessions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No usable session could be provisioned. Nothing is left allocated.
    #[error("session could not be opened: {0}")]
    Open(String),

    #[error("session {session_id} could not be released: {message}")]
    Close { session_id: String, message: String },

    /// Any non-2xx answer from the provider API.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
