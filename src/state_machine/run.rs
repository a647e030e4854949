use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::State;
use crate::artifact::Artifact;
use crate::session::{BrowserSession, SessionStatus};

/// Why a run ended in `Closed(Failure)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The target page could not be loaded.
    Navigation(String),
    /// The résumé could not be downloaded or stored.
    Fetch(String),
    /// The form-fill observation call failed.
    Observation(String),
    /// A step panicked.
    Internal(String),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Navigation(msg) => write!(f, "Navigation failure: {msg}"),
            FailureKind::Fetch(msg) => write!(f, "Fetch failure: {msg}"),
            FailureKind::Observation(msg) => write!(f, "Observation failure: {msg}"),
            FailureKind::Internal(msg) => write!(f, "Internal failure: {msg}"),
        }
    }
}

/// The result of executing one step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failure(FailureKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalState {
    Completed,
    Failed(FailureKind),
}

/// Reasons the résumé was not attached. None of them stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSkipped {
    NoCandidates,
    NotAnInputControl(String),
    ObservationFailed(String),
    UploadFailed(String),
}

impl std::fmt::Display for AttachmentSkipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentSkipped::NoCandidates => write!(f, "no file-input candidates observed"),
            AttachmentSkipped::NotAnInputControl(selector) => {
                write!(f, "first candidate is not an input control: {selector}")
            }
            AttachmentSkipped::ObservationFailed(msg) => {
                write!(f, "file-input observation failed: {msg}")
            }
            AttachmentSkipped::UploadFailed(msg) => write!(f, "upload failed: {msg}"),
        }
    }
}

/// One end-to-end form-fill execution. Mutated only by the task driving it.
#[derive(Debug, Clone)]
pub struct OrchestrationRun {
    pub id: String,
    pub target_url: String,
    pub session: BrowserSession,
    /// Captured at open; the session itself stops exposing it once closed.
    pub live_view_url: String,
    pub artifact: Option<Artifact>,
    pub artifact_attached: bool,
    /// Number of `act` invocations, successful or not.
    pub actions_executed: usize,
    pub actions_failed: usize,
    pub state: State,
    pub state_history: Vec<State>,
    pub terminal_state: Option<TerminalState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrchestrationRun {
    pub fn new(target_url: String, session: BrowserSession) -> Self {
        let now = Utc::now();
        let live_view_url = session.live_view_link().unwrap_or_default().to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            target_url,
            session,
            live_view_url,
            artifact: None,
            artifact_attached: false,
            actions_executed: 0,
            actions_failed: 0,
            state: State::Init,
            state_history: Vec::new(),
            terminal_state: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Serializable snapshot of a run, published on every transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub target_url: String,
    pub session_id: String,
    pub session_status: SessionStatus,
    pub live_view_url: String,
    pub state: State,
    pub state_transitions: Vec<State>,
    pub artifact: Option<Artifact>,
    pub artifact_attached: bool,
    pub actions_executed: usize,
    pub actions_failed: usize,
    pub outcome: Option<TerminalState>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunRecord {
    pub fn from_run(run: &OrchestrationRun) -> Self {
        let mut transitions = run.state_history.clone();
        transitions.push(run.state);

        Self {
            run_id: run.id.clone(),
            target_url: run.target_url.clone(),
            session_id: run.session.session_id.clone(),
            session_status: run.session.status,
            live_view_url: run.live_view_url.clone(),
            state: run.state,
            state_transitions: transitions,
            artifact: run.artifact.clone(),
            artifact_attached: run.artifact_attached,
            actions_executed: run.actions_executed,
            actions_failed: run.actions_failed,
            outcome: run.terminal_state.clone(),
            started_at: run.created_at,
            updated_at: run.updated_at,
            duration_ms: (run.updated_at - run.created_at).num_milliseconds(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}
