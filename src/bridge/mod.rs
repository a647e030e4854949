//! Typed boundary to the external perception/action capability.
//!
//! The service inspects the live page and proposes candidate actions for a
//! natural-language goal, then executes them one at a time. How it reasons is
//! not our concern; callers only rely on the call contract of
//! [`PageAutomation`].

pub mod client;
pub mod error;
pub mod types;

use std::path::Path;

use async_trait::async_trait;

pub use client::{AutomationCredentials, StagehandClient};
pub use error::BridgeError;
pub use types::{ActResult, ObservedAction};

/// Page operations against the browser behind a session id.
///
/// `observe` is non-deterministic: two calls for the same goal may propose
/// different actions. Ordering is only meaningful within one returned list.
#[async_trait]
pub trait PageAutomation: Send + Sync {
    async fn navigate(&self, session_id: &str, url: &str) -> Result<(), BridgeError>;

    /// Propose actions for `instruction`. The list may be empty.
    async fn observe(
        &self,
        session_id: &str,
        instruction: &str,
    ) -> Result<Vec<ObservedAction>, BridgeError>;

    /// Execute one previously observed action.
    async fn act(&self, session_id: &str, action: &ObservedAction) -> Result<ActResult, BridgeError>;

    /// Put a local file into the file-input control at `selector`.
    async fn set_input_files(
        &self,
        session_id: &str,
        selector: &str,
        file: &Path,
    ) -> Result<(), BridgeError>;
}
