use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use reqwest::Url;
use serde::Serialize;
use tempfile::TempDir;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::artifact::{Artifact, ArtifactFetcher};
use crate::bridge::PageAutomation;
use crate::config::JobpilotConfig;
use crate::error::{JobpilotError, Result};
use crate::registry::RunRegistry;
use crate::session::SessionManager;
use crate::state_machine::{
    AttachmentSkipped, FailureKind, OrchestrationRun, RunRecord, StateMachine, StepOutcome,
    TerminalState, Transition,
};

/// Observation goal used to find where the résumé goes.
pub const FILE_INPUT_GOAL: &str = "find the <input type='file'> control for uploading a PDF resume file";

/// Observation goal used to fill the rest of the form.
pub const FORM_FILL_GOAL: &str =
    "fill in the job application form with placeholder data, do not submit it";

/// No run ever performs more `act` calls than this, whatever the
/// configuration asks for.
pub const MAX_ACTIONS_CAP: usize = 5;

/// Per-run policy knobs.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub resume_url: String,
    pub scratch_root: PathBuf,
    /// Limit on `act` calls per run, never above [`MAX_ACTIONS_CAP`].
    pub max_actions: usize,
    /// Time the session stays open after the last action.
    pub settle_delay: Duration,
}

impl RunSettings {
    pub fn from_config(config: &JobpilotConfig) -> Self {
        Self {
            resume_url: config.resume_url.clone(),
            scratch_root: config.scratch_root(),
            max_actions: config.max_actions.min(MAX_ACTIONS_CAP),
            settle_delay: config.settle_delay(),
        }
    }
}

/// What the caller gets back as soon as the session is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunHandle {
    pub run_id: String,
    pub session_id: String,
    pub live_view_url: String,
}

impl From<&OrchestrationRun> for RunHandle {
    fn from(run: &OrchestrationRun) -> Self {
        Self {
            run_id: run.id.clone(),
            session_id: run.session.session_id.clone(),
            live_view_url: run.live_view_url.clone(),
        }
    }
}

/// Drives form-fill runs: navigate, fetch the résumé, attach it, observe and
/// execute a bounded number of actions, settle, close.
pub struct FormFillOrchestrator {
    sessions: SessionManager,
    page: Arc<dyn PageAutomation>,
    fetcher: ArtifactFetcher,
    settings: RunSettings,
    registry: RunRegistry,
    admission: Arc<Semaphore>,
    max_sessions: usize,
}

impl FormFillOrchestrator {
    pub fn new(
        sessions: SessionManager,
        page: Arc<dyn PageAutomation>,
        mut settings: RunSettings,
        registry: RunRegistry,
        max_sessions: usize,
    ) -> Self {
        settings.max_actions = settings.max_actions.min(MAX_ACTIONS_CAP);
        let max_sessions = max_sessions.max(1);
        Self {
            sessions,
            page,
            fetcher: ArtifactFetcher::new(),
            settings,
            registry,
            admission: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
        }
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    /// Open a session and schedule the rest of the run in the background.
    ///
    /// Returns once the session is active. The background task holds an
    /// admission permit until the session has been closed.
    pub async fn start(self: &Arc<Self>, target_url: &str) -> Result<RunHandle> {
        let (run, permit) = self.open_run(target_url).await?;
        let handle = RunHandle::from(&run);

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = permit;
            orchestrator.drive(run).await;
        });

        Ok(handle)
    }

    /// Same as [`start`](Self::start) but waits for the run to finish.
    /// `on_open` sees the handle before any automation happens.
    pub async fn run_foreground(
        &self,
        target_url: &str,
        on_open: impl FnOnce(&RunHandle),
    ) -> Result<RunRecord> {
        let (run, _permit) = self.open_run(target_url).await?;
        on_open(&RunHandle::from(&run));
        Ok(self.drive(run).await)
    }

    async fn open_run(&self, target_url: &str) -> Result<(OrchestrationRun, OwnedSemaphorePermit)> {
        validate_target_url(target_url)?;
        let permit = Arc::clone(&self.admission)
            .try_acquire_owned()
            .map_err(|_| JobpilotError::AtCapacity(self.max_sessions))?;

        let session = self.sessions.open().await?;
        let mut run = OrchestrationRun::new(target_url.to_string(), session);
        StateMachine::next(&mut run, StepOutcome::Success);
        info!(
            run_id = %run.id,
            session_id = %run.session.session_id,
            target = %run.target_url,
            "form-fill run started"
        );
        self.registry.publish(&run);

        Ok((run, permit))
    }

    /// Execute every step after the session was opened, then release the
    /// session exactly once whatever the outcome, panics included.
    async fn drive(&self, mut run: OrchestrationRun) -> RunRecord {
        let result = match AssertUnwindSafe(self.execute(&mut run)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(FailureKind::Internal(panic_message(panic.as_ref()))),
        };

        if let Err(e) = self.sessions.close(&mut run.session).await {
            error!(run_id = %run.id, "failed to close session: {e}");
        }

        let outcome = match result {
            Ok(()) => StepOutcome::Success,
            Err(kind) => StepOutcome::Failure(kind),
        };
        match StateMachine::next(&mut run, outcome) {
            Transition::Close(TerminalState::Completed) => info!(
                run_id = %run.id,
                actions = run.actions_executed,
                failed_actions = run.actions_failed,
                attached = run.artifact_attached,
                "form-fill run completed"
            ),
            Transition::Close(TerminalState::Failed(kind)) => {
                error!(run_id = %run.id, state = ?run.state_history.last(), "form-fill run failed: {kind}")
            }
            Transition::Next(state) => {
                warn!(run_id = %run.id, %state, "run left open after teardown")
            }
        }

        self.registry.publish(&run);
        RunRecord::from_run(&run)
    }

    async fn execute(&self, run: &mut OrchestrationRun) -> std::result::Result<(), FailureKind> {
        let session_id = run.session.session_id.clone();

        // NAVIGATING
        self.page
            .navigate(&session_id, &run.target_url)
            .await
            .map_err(|e| FailureKind::Navigation(e.to_string()))?;
        self.advance(run);

        // FETCHING_ARTIFACT. The scratch directory is removed when `scratch`
        // drops at the end of this function.
        let scratch = self
            .scratch_dir()
            .map_err(|e| FailureKind::Fetch(format!("scratch directory: {e}")))?;
        let artifact = self
            .fetcher
            .fetch(&self.settings.resume_url, scratch.path())
            .await
            .map_err(|e| FailureKind::Fetch(e.to_string()))?;
        run.artifact = Some(artifact.clone());
        self.advance(run);

        // ATTACHING_ARTIFACT
        match self.attach(&session_id, &artifact).await {
            Ok(selector) => {
                run.artifact_attached = true;
                info!(run_id = %run.id, %selector, "résumé attached");
            }
            Err(skipped) => warn!(run_id = %run.id, "attachment skipped: {skipped}"),
        }
        self.advance(run);

        // OBSERVING_ACTIONS
        let actions = self
            .page
            .observe(&session_id, FORM_FILL_GOAL)
            .await
            .map_err(|e| FailureKind::Observation(e.to_string()))?;
        info!(run_id = %run.id, observed = actions.len(), "form actions observed");
        self.advance(run);

        // EXECUTING_ACTIONS
        for action in actions.iter().take(self.settings.max_actions) {
            run.actions_executed += 1;
            match self.page.act(&session_id, action).await {
                Ok(result) if result.success => {
                    debug!(run_id = %run.id, selector = %action.selector, "{}", result.message)
                }
                Ok(result) => {
                    run.actions_failed += 1;
                    warn!(run_id = %run.id, selector = %action.selector, "action reported failure: {}", result.message);
                }
                Err(e) => {
                    run.actions_failed += 1;
                    warn!(run_id = %run.id, selector = %action.selector, "{e}");
                }
            }
            self.registry.publish(run);
        }
        if actions.len() > self.settings.max_actions {
            info!(
                run_id = %run.id,
                skipped = actions.len() - self.settings.max_actions,
                "action cap reached"
            );
        }
        self.advance(run);

        // SETTLING
        debug!(run_id = %run.id, delay = ?self.settings.settle_delay, "holding session for viewers");
        sleep(self.settings.settle_delay).await;

        Ok(())
    }

    /// Best-effort attachment of the résumé to the first observed file input.
    async fn attach(
        &self,
        session_id: &str,
        artifact: &Artifact,
    ) -> std::result::Result<String, AttachmentSkipped> {
        let candidates = self
            .page
            .observe(session_id, FILE_INPUT_GOAL)
            .await
            .map_err(|e| AttachmentSkipped::ObservationFailed(e.to_string()))?;
        let first = candidates
            .into_iter()
            .next()
            .ok_or(AttachmentSkipped::NoCandidates)?;
        if !first.targets_input_control() {
            return Err(AttachmentSkipped::NotAnInputControl(first.selector));
        }

        self.page
            .set_input_files(session_id, &first.selector, &artifact.local_path)
            .await
            .map_err(|e| AttachmentSkipped::UploadFailed(e.to_string()))?;
        Ok(first.selector)
    }

    fn advance(&self, run: &mut OrchestrationRun) {
        StateMachine::next(run, StepOutcome::Success);
        debug!(run_id = %run.id, state = %run.state, "state transition");
        self.registry.publish(run);
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        std::fs::create_dir_all(&self.settings.scratch_root)?;
        tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(&self.settings.scratch_root)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("step panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("step panicked: {msg}")
    } else {
        "step panicked".to_string()
    }
}

fn validate_target_url(target_url: &str) -> Result<()> {
    let url = Url::parse(target_url)
        .map_err(|e| JobpilotError::InvalidParams(format!("invalid url {target_url:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(JobpilotError::InvalidParams(format!(
            "unsupported url scheme {other:?}, expected http or https"
        ))),
    }
}
