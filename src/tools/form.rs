use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, ToolContext, ToolSchema, required_str};
use crate::error::{JobpilotError, Result};
use crate::orchestrator::RunHandle;

/// Message the live-view page posts to its parent when the session ends.
pub const DISCONNECT_MESSAGE: &str = "browserbase-disconnected";

pub struct FillFormTool;

#[async_trait]
impl Tool for FillFormTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fill_form",
            description: "Open a live remote browser on a job application page and start filling \
                the form in the background, attaching the user's résumé. Returns immediately with \
                a live-view link that must be shown to the user as an embedded iframe.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL of the job application form"
                    }
                },
                "required": ["url"]
            }),
        }
    }

    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let url = required_str(&params, "url")?;
        let missing = ctx.config.missing_browser_credentials();
        if !missing.is_empty() {
            return Err(JobpilotError::Config(format!("missing {}", missing.join(", "))));
        }

        let handle = ctx.orchestrator.start(url.trim()).await?;
        Ok(live_view_embed(&handle))
    }
}

/// Instructions for the consuming UI: a sandboxed iframe on the live view,
/// swapped for a plain link once the session disconnects.
pub fn live_view_embed(handle: &RunHandle) -> String {
    let url = &handle.live_view_url;
    format!(
        "Live browser session started (run {run_id}, session {session_id}). The application form \
is being filled in the background; call `run_status` with run id {run_id} to follow progress.

Render the session for the user with this iframe:

<iframe data-live-view src=\"{url}\" sandbox=\"allow-same-origin allow-scripts\" \
allow=\"clipboard-read; clipboard-write\" style=\"width: 100%; height: 600px; border: none; \
pointer-events: none;\"></iframe>

and swap it for the fallback link when the session disconnects:

<script>
window.addEventListener(\"message\", (event) => {{
  if (event.data === \"{DISCONNECT_MESSAGE}\") {{
    document.querySelector(\"iframe[data-live-view]\").outerHTML =
      '<a href=\"{url}\" target=\"_blank\">Open the browser session</a>';
  }}
}});
</script>

Fallback link: {url}",
        run_id = handle.run_id,
        session_id = handle.session_id,
    )
}

pub struct RunStatusTool;

#[async_trait]
impl Tool for RunStatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "run_status",
            description: "Report the progress of a form-filling run started by fill_form: current \
                state, actions executed, whether the résumé was attached, and the final outcome.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "run_id": {
                        "type": "string",
                        "description": "Run id returned by fill_form"
                    }
                },
                "required": ["run_id"]
            }),
        }
    }

    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let run_id = required_str(&params, "run_id")?;
        let record = ctx
            .orchestrator
            .registry()
            .get(run_id.trim())
            .ok_or_else(|| JobpilotError::RunNotFound(run_id.clone()))?;
        Ok(serde_json::to_string_pretty(&record)?)
    }
}
