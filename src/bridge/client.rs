use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};

use super::PageAutomation;
use super::error::BridgeError;
use super::types::{ActRequest, ActResult, NavigateRequest, ObserveRequest, ObservedAction};
use crate::artifact::DEFAULT_FILE_NAME;

/// Credentials and model settings forwarded with every automation call.
#[derive(Debug, Clone, Default)]
pub struct AutomationCredentials {
    pub browserbase_api_key: String,
    pub project_id: String,
    pub model_api_key: String,
    pub model_name: String,
}

/// HTTP client for the observe/act page automation service.
pub struct StagehandClient {
    credentials: AutomationCredentials,
    client: Client,
    base_url: String,
}

impl StagehandClient {
    /// Create a client for the automation API rooted at `base_url`.
    pub fn with_base_url(credentials: AutomationCredentials, base_url: String) -> Self {
        // Observation runs a model over the page, so allow a generous timeout.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            credentials,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn post(&self, session_id: &str, operation: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/sessions/{session_id}/{operation}", self.base_url))
            .header("x-bb-api-key", &self.credentials.browserbase_api_key)
            .header("x-bb-project-id", &self.credentials.project_id)
            .header("x-model-api-key", &self.credentials.model_api_key)
            .header("x-model-name", &self.credentials.model_name)
    }
}

async fn check_status(response: Response) -> Result<Response, BridgeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(BridgeError::ApiError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl PageAutomation for StagehandClient {
    async fn navigate(&self, session_id: &str, url: &str) -> Result<(), BridgeError> {
        let result = async {
            let response = self
                .post(session_id, "navigate")
                .json(&NavigateRequest { url: url.to_string() })
                .send()
                .await?;
            Ok::<_, BridgeError>(check_status(response).await?)
        }
        .await;

        result.map(|_| ()).map_err(|e| BridgeError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn observe(
        &self,
        session_id: &str,
        instruction: &str,
    ) -> Result<Vec<ObservedAction>, BridgeError> {
        let result = async {
            let response = self
                .post(session_id, "observe")
                .json(&ObserveRequest {
                    instruction: instruction.to_string(),
                })
                .send()
                .await?;
            Ok::<_, BridgeError>(check_status(response).await?.json::<Vec<ObservedAction>>().await?)
        }
        .await;

        result.map_err(|e| BridgeError::Observation(e.to_string()))
    }

    async fn act(&self, session_id: &str, action: &ObservedAction) -> Result<ActResult, BridgeError> {
        let result = async {
            let response = self
                .post(session_id, "act")
                .json(&ActRequest {
                    action: action.clone(),
                })
                .send()
                .await?;
            Ok::<_, BridgeError>(check_status(response).await?.json::<ActResult>().await?)
        }
        .await;

        result.map_err(|e| BridgeError::Action(e.to_string()))
    }

    async fn set_input_files(
        &self,
        session_id: &str,
        selector: &str,
        file: &Path,
    ) -> Result<(), BridgeError> {
        let result = async {
            let bytes = tokio::fs::read(file).await?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
            let form = Form::new()
                .text("selector", selector.to_string())
                .part("file", Part::bytes(bytes).file_name(file_name));
            let response = self.post(session_id, "upload").multipart(form).send().await?;
            Ok::<_, BridgeError>(check_status(response).await?)
        }
        .await;

        result.map(|_| ()).map_err(|e| BridgeError::Upload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StagehandClient {
        StagehandClient::with_base_url(
            AutomationCredentials {
                browserbase_api_key: "bb_test".into(),
                project_id: "proj-1".into(),
                model_api_key: "model_key".into(),
                model_name: "test/model".into(),
            },
            server.uri(),
        )
    }

    #[tokio::test]
    async fn navigate_posts_url_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/sess_1/navigate"))
            .and(header("x-bb-api-key", "bb_test"))
            .and(header("x-model-name", "test/model"))
            .and(body_json(serde_json::json!({"url": "https://jobs.example/apply"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .navigate("sess_1", "https://jobs.example/apply")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn navigate_failure_is_a_navigation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/sess_1/navigate"))
            .respond_with(ResponseTemplate::new(502).set_body_string("net::ERR_CONNECTION_REFUSED"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .navigate("sess_1", "https://unreachable.example")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Navigation { .. }));
        assert!(err.to_string().contains("ERR_CONNECTION_REFUSED"));
    }

    #[tokio::test]
    async fn observe_returns_actions_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/sess_1/observe"))
            .and(body_json(serde_json::json!({"instruction": "fill the form"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"selector": "#first", "description": "First name", "method": "fill", "arguments": ["Jane"]},
                {"selector": "#last", "description": "Last name", "method": "fill", "arguments": ["Doe"]}
            ])))
            .mount(&server)
            .await;

        let actions = client_for(&server)
            .observe("sess_1", "fill the form")
            .await
            .unwrap();
        let selectors: Vec<&str> = actions.iter().map(|a| a.selector.as_str()).collect();
        assert_eq!(selectors, vec!["#first", "#last"]);
    }

    #[tokio::test]
    async fn malformed_observation_is_an_observation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/sess_1/observe"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).observe("sess_1", "anything").await.unwrap_err();
        assert!(matches!(err, BridgeError::Observation(_)));
    }

    #[tokio::test]
    async fn act_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/sess_1/act"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "filled #first"
            })))
            .mount(&server)
            .await;

        let action = ObservedAction {
            selector: "#first".into(),
            description: "First name".into(),
            method: Some("fill".into()),
            arguments: vec!["Jane".into()],
        };
        let result = client_for(&server).act("sess_1", &action).await.unwrap();
        assert!(result.success);
        assert_eq!(result.message, "filled #first");
    }

    #[tokio::test]
    async fn upload_sends_file_contents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/sess_1/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("resume.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        client_for(&server)
            .set_input_files("sess_1", "xpath=/html/body/input", &file)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("xpath=/html/body/input"));
        assert!(body.contains("%PDF"));
        assert!(body.contains("resume.pdf"));
    }

    #[tokio::test]
    async fn upload_of_missing_file_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .set_input_files("sess_1", "input", Path::new("/no/such/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Upload(_)));
    }
}
