use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("job search API key is not configured (set JOB_SEARCH_API_KEY)")]
    MissingApiKey,

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
