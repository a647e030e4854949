//! Lifecycle of remote browser sessions.
//!
//! [`SessionProvider`] is the raw provisioning API. [`SessionManager`] wraps it
//! with the lifecycle rules: an open either yields an `Active` session with a
//! live-view link or leaves nothing allocated, and a session is released at
//! most once.

pub mod client;
pub mod error;
pub mod types;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use client::BrowserbaseClient;
pub use error::SessionError;

/// Remote session provisioning, keyed by the provider's opaque session id.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Provision a new session and return its id.
    async fn create(&self) -> Result<String, SessionError>;
    /// Resolve the capability URL a third party can use to watch the session.
    async fn live_view_url(&self, session_id: &str) -> Result<String, SessionError>;
    /// Tear the session down.
    async fn release(&self, session_id: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Initializing,
    Active,
    Closed,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Initializing => write!(f, "INITIALIZING"),
            SessionStatus::Active => write!(f, "ACTIVE"),
            SessionStatus::Closed => write!(f, "CLOSED"),
            SessionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One provisioned remote browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSession {
    pub session_id: String,
    live_view_url: String,
    pub status: SessionStatus,
}

impl BrowserSession {
    fn initializing(session_id: String) -> Self {
        Self {
            session_id,
            live_view_url: String::new(),
            status: SessionStatus::Initializing,
        }
    }

    /// Live-view link, available only while the session is active.
    pub fn live_view_link(&self) -> Option<&str> {
        match self.status {
            SessionStatus::Active => Some(&self.live_view_url),
            _ => None,
        }
    }
}

/// Opens and closes sessions through a [`SessionProvider`].
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn SessionProvider>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    /// Provision a session and resolve its live-view link.
    ///
    /// If the link cannot be resolved the fresh session is released again
    /// before the error is returned.
    pub async fn open(&self) -> Result<BrowserSession, SessionError> {
        let session_id = self
            .provider
            .create()
            .await
            .map_err(|e| SessionError::Open(e.to_string()))?;
        let mut session = BrowserSession::initializing(session_id);

        match self.provider.live_view_url(&session.session_id).await {
            Ok(url) => {
                session.live_view_url = url;
                session.status = SessionStatus::Active;
                info!(session_id = %session.session_id, "browser session active");
                Ok(session)
            }
            Err(e) => {
                session.status = SessionStatus::Failed;
                if let Err(release_err) = self.provider.release(&session.session_id).await {
                    warn!(
                        session_id = %session.session_id,
                        "failed to release half-open session: {release_err}"
                    );
                }
                Err(SessionError::Open(format!("live-view link unavailable: {e}")))
            }
        }
    }

    /// Release the session. A second call on the same session is a no-op.
    pub async fn close(&self, session: &mut BrowserSession) -> Result<(), SessionError> {
        if session.status == SessionStatus::Closed {
            warn!(session_id = %session.session_id, "session already closed");
            return Ok(());
        }
        session.status = SessionStatus::Closed;
        info!(session_id = %session.session_id, "closing browser session");
        self.provider
            .release(&session.session_id)
            .await
            .map_err(|e| SessionError::Close {
                session_id: session.session_id.clone(),
                message: e.to_string(),
            })
    }
}
