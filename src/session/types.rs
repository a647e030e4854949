//! Wire types for the session provisioning API.

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub project_id: String,
}

/// Session object returned on creation. Extra provider fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Answer of `GET /v1/sessions/{id}/debug`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub debugger_fullscreen_url: String,
}

/// Body of `POST /v1/sessions/{id}` asking the provider to tear the session down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSessionRequest {
    pub project_id: String,
    pub status: String,
}

impl ReleaseSessionRequest {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            status: "REQUEST_RELEASE".to_string(),
        }
    }
}
