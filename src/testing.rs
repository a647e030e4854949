//! In-memory fakes shared by the unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;

use crate::bridge::{ActResult, BridgeError, ObservedAction, PageAutomation};
use crate::config::JobpilotConfig;
use crate::jobs::JobSearchClient;
use crate::ledger::Ledger;
use crate::orchestrator::{FILE_INPUT_GOAL, FormFillOrchestrator, RunSettings};
use crate::registry::RunRegistry;
use crate::session::{SessionError, SessionManager, SessionProvider};
use crate::state_machine::OrchestrationRun;
use crate::tools::ToolContext;

/// Session provider that counts calls and can be told to fail.
#[derive(Default)]
pub struct FakeSessions {
    pub fail_create: bool,
    pub fail_live_view: bool,
    pub fail_release: bool,
    pub created: AtomicUsize,
    pub released: AtomicUsize,
    pub released_at: Mutex<Option<Instant>>,
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn create(&self) -> Result<String, SessionError> {
        if self.fail_create {
            return Err(SessionError::ApiError {
                status: 429,
                message: "session quota exhausted".into(),
            });
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("sess_{n}"))
    }

    async fn live_view_url(&self, session_id: &str) -> Result<String, SessionError> {
        if self.fail_live_view {
            return Err(SessionError::ApiError {
                status: 404,
                message: "debug url not ready".into(),
            });
        }
        Ok(format!("https://live.test/{session_id}"))
    }

    async fn release(&self, _session_id: &str) -> Result<(), SessionError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        *self.released_at.lock().unwrap() = Some(Instant::now());
        if self.fail_release {
            return Err(SessionError::ApiError {
                status: 500,
                message: "release failed".into(),
            });
        }
        Ok(())
    }
}

/// Page automation fake with scripted observations.
#[derive(Default)]
pub struct FakePage {
    pub fail_navigate: bool,
    pub fail_file_observe: bool,
    pub fail_form_observe: bool,
    pub fail_upload: bool,
    pub panic_on_form_observe: bool,
    pub file_inputs: Vec<ObservedAction>,
    pub form_actions: Vec<ObservedAction>,
    /// Zero-based `act` call numbers that fail.
    pub failing_acts: Vec<usize>,
    pub navigations: AtomicUsize,
    pub observations: Mutex<Vec<String>>,
    pub acts: AtomicUsize,
    /// Selector and whether the file existed at upload time.
    pub uploads: Mutex<Vec<(String, bool)>>,
    pub last_act_at: Mutex<Option<Instant>>,
}

impl FakePage {
    pub fn observation_count(&self) -> usize {
        self.observations.lock().unwrap().len()
    }
}

#[async_trait]
impl PageAutomation for FakePage {
    async fn navigate(&self, _session_id: &str, url: &str) -> Result<(), BridgeError> {
        self.navigations.fetch_add(1, Ordering::SeqCst);
        if self.fail_navigate {
            return Err(BridgeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        Ok(())
    }

    async fn observe(
        &self,
        _session_id: &str,
        instruction: &str,
    ) -> Result<Vec<ObservedAction>, BridgeError> {
        self.observations.lock().unwrap().push(instruction.to_string());
        if instruction == FILE_INPUT_GOAL {
            if self.fail_file_observe {
                return Err(BridgeError::Observation("model timeout".into()));
            }
            return Ok(self.file_inputs.clone());
        }
        if self.panic_on_form_observe {
            panic!("observer crashed");
        }
        if self.fail_form_observe {
            return Err(BridgeError::Observation("model timeout".into()));
        }
        Ok(self.form_actions.clone())
    }

    async fn act(&self, _session_id: &str, action: &ObservedAction) -> Result<ActResult, BridgeError> {
        let n = self.acts.fetch_add(1, Ordering::SeqCst);
        *self.last_act_at.lock().unwrap() = Some(Instant::now());
        if self.failing_acts.contains(&n) {
            return Err(BridgeError::Action(format!("element {} detached", action.selector)));
        }
        Ok(ActResult {
            success: true,
            message: format!("performed {}", action.description),
        })
    }

    async fn set_input_files(
        &self,
        _session_id: &str,
        selector: &str,
        file: &Path,
    ) -> Result<(), BridgeError> {
        self.uploads
            .lock()
            .unwrap()
            .push((selector.to_string(), file.exists()));
        if self.fail_upload {
            return Err(BridgeError::Upload("input detached".into()));
        }
        Ok(())
    }
}

pub fn form_action(n: usize) -> ObservedAction {
    ObservedAction {
        selector: format!("#field-{n}"),
        description: format!("fill field {n}"),
        method: Some("fill".into()),
        arguments: vec![format!("placeholder {n}")],
    }
}

pub fn file_input(selector: &str) -> ObservedAction {
    ObservedAction {
        selector: selector.to_string(),
        description: "Resume/CV upload".into(),
        method: Some("setInputFiles".into()),
        arguments: Vec::new(),
    }
}

/// A fresh run on an active fake session.
pub async fn make_run(target_url: &str) -> OrchestrationRun {
    let manager = SessionManager::new(Arc::new(FakeSessions::default()));
    let session = manager.open().await.unwrap();
    OrchestrationRun::new(target_url.to_string(), session)
}

pub fn scratch_root() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("uploads");
    (dir, root)
}

/// Tool context over fake sessions and pages. Background runs fail fast at
/// the résumé fetch, and the job search client has no reachable backend.
pub fn tool_context(config: JobpilotConfig) -> (ToolContext, Arc<FakeSessions>) {
    let sessions = Arc::new(FakeSessions::default());
    let settings = RunSettings {
        resume_url: "http://127.0.0.1:1/resume.pdf".into(),
        scratch_root: std::env::temp_dir().join("jobpilot-tests"),
        max_actions: config.max_actions,
        settle_delay: std::time::Duration::ZERO,
    };
    let orchestrator = FormFillOrchestrator::new(
        SessionManager::new(sessions.clone()),
        Arc::new(FakePage::default()),
        settings,
        RunRegistry::new(),
        config.max_concurrent_sessions,
    );
    let jobs = JobSearchClient::with_base_url(
        config.job_search_api_key.clone(),
        "http://127.0.0.1:1".into(),
    );

    let ctx = ToolContext {
        config: Arc::new(config),
        ledger: Ledger::new(),
        orchestrator: Arc::new(orchestrator),
        jobs: Arc::new(jobs),
    };
    (ctx, sessions)
}
