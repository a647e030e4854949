use thiserror::Error;

use crate::artifact::FetchError;
use crate::bridge::BridgeError;
use crate::jobs::JobSearchError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum JobpilotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Too many active browser sessions (limit {0}), try again once a run finishes")]
    AtCapacity(usize),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Page automation error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Artifact fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Job search error: {0}")]
    JobSearch(#[from] JobSearchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = JobpilotError> = std::result::Result<T, E>;
