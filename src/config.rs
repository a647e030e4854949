//! Runtime configuration loaded from `jobpilot.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Secrets are usually supplied through the environment (or a `.env` file)
//! and take precedence over the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const CONFIG_FILE: &str = "jobpilot.toml";

/// Top-level configuration for the tool server and the form-fill runs.
#[derive(Debug, Clone, Deserialize)]
pub struct JobpilotConfig {
    /// API key for the remote browser provider.
    #[serde(default)]
    pub browserbase_api_key: String,

    /// Project the remote browser sessions are billed to.
    #[serde(default)]
    pub browserbase_project_id: String,

    /// API key forwarded to the perception/action model.
    #[serde(default)]
    pub model_api_key: String,

    /// Model used by the page automation service for observe/act.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Base URL of the session provisioning API.
    #[serde(default = "default_session_api_url")]
    pub session_api_url: String,

    /// Base URL of the page automation (observe/act) API.
    #[serde(default = "default_automation_api_url")]
    pub automation_api_url: String,

    /// Résumé attached to every application form.
    #[serde(default = "default_resume_url")]
    pub resume_url: String,

    /// Root under which each run creates its scratch directory.
    /// Defaults to `<system temp>/uploads`.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Upper bound on form actions executed per run.
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,

    /// Seconds the session stays open after the last action.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Number of browser sessions allowed to run at the same time.
    #[serde(default = "default_max_concurrent_sessions")]
    pub max_concurrent_sessions: usize,

    #[serde(default = "default_job_search_url")]
    pub job_search_url: String,

    #[serde(default)]
    pub job_search_api_key: String,

    /// Address the tool server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Destination of the `create_tex` tool.
    #[serde(default = "default_cv_path")]
    pub cv_path: PathBuf,
}

fn default_model_name() -> String {
    "google/gemini-2.5-flash-preview-05-20".to_string()
}

fn default_session_api_url() -> String {
    "https://api.browserbase.com".to_string()
}

fn default_automation_api_url() -> String {
    "https://api.stagehand.browserbase.com/v1".to_string()
}

fn default_resume_url() -> String {
    "https://tiyrs98e90uelbs3.public.blob.vercel-storage.com/resume-OKXnr4Xt5PLwnqSpEo0WoWljdxI2Rh.pdf"
        .to_string()
}

fn default_max_actions() -> usize {
    5
}

fn default_settle_delay_secs() -> u64 {
    30
}

fn default_max_concurrent_sessions() -> usize {
    3
}

fn default_job_search_url() -> String {
    "https://jsearch.p.rapidapi.com".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_cv_path() -> PathBuf {
    PathBuf::from("./cv/cv.tex")
}

impl Default for JobpilotConfig {
    fn default() -> Self {
        Self {
            browserbase_api_key: String::new(),
            browserbase_project_id: String::new(),
            model_api_key: String::new(),
            model_name: default_model_name(),
            session_api_url: default_session_api_url(),
            automation_api_url: default_automation_api_url(),
            resume_url: default_resume_url(),
            scratch_dir: None,
            max_actions: default_max_actions(),
            settle_delay_secs: default_settle_delay_secs(),
            max_concurrent_sessions: default_max_concurrent_sessions(),
            job_search_url: default_job_search_url(),
            job_search_api_key: String::new(),
            bind_addr: default_bind_addr(),
            cv_path: default_cv_path(),
        }
    }
}

impl JobpilotConfig {
    /// Loads `jobpilot.toml` (or `path` when given), then applies `.env` and
    /// environment overrides for the secrets.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<JobpilotConfig>(&contents)?
        } else {
            Self::default()
        };

        override_from_env(&mut config.browserbase_api_key, "BROWSERBASE_API_KEY");
        override_from_env(&mut config.browserbase_project_id, "BROWSERBASE_PROJECT_ID");
        override_from_env(&mut config.model_api_key, "MODEL_API_KEY");
        override_from_env(&mut config.job_search_api_key, "JOB_SEARCH_API_KEY");

        Ok(config)
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("uploads"))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    /// Names of the secrets a form-fill run cannot start without.
    pub fn missing_browser_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.browserbase_api_key.is_empty() {
            missing.push("BROWSERBASE_API_KEY");
        }
        if self.browserbase_project_id.is_empty() {
            missing.push("BROWSERBASE_PROJECT_ID");
        }
        missing
    }
}

// Non-empty environment values win over the file.
fn override_from_env(field: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            *field = value;
        }
    }
}
