use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use super::SessionProvider;
use super::error::SessionError;
use super::types::{CreateSessionRequest, DebugResponse, ReleaseSessionRequest, SessionResponse};

/// HTTP client for the remote browser provider.
pub struct BrowserbaseClient {
    api_key: String,
    project_id: String,
    client: Client,
    base_url: String,
}

impl BrowserbaseClient {
    /// Create a client for the provider API rooted at `base_url`.
    pub fn with_base_url(api_key: String, project_id: String, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_key,
            project_id,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn check_status(response: Response) -> Result<Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(SessionError::ApiError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SessionProvider for BrowserbaseClient {
    async fn create(&self) -> Result<String, SessionError> {
        let response = self
            .client
            .post(self.url("/v1/sessions"))
            .header("X-BB-API-Key", &self.api_key)
            .json(&CreateSessionRequest {
                project_id: self.project_id.clone(),
            })
            .send()
            .await?;
        let session = check_status(response).await?.json::<SessionResponse>().await?;
        Ok(session.id)
    }

    async fn live_view_url(&self, session_id: &str) -> Result<String, SessionError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/sessions/{session_id}/debug")))
            .header("X-BB-API-Key", &self.api_key)
            .send()
            .await?;
        let debug = check_status(response).await?.json::<DebugResponse>().await?;
        Ok(debug.debugger_fullscreen_url)
    }

    async fn release(&self, session_id: &str) -> Result<(), SessionError> {
        let response = self
            .client
            .post(self.url(&format!("/v1/sessions/{session_id}")))
            .header("X-BB-API-Key", &self.api_key)
            .json(&ReleaseSessionRequest::new(self.project_id.clone()))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
