//! Tools exposed to the agent runtime.
//!
//! Every tool answers with text. Failures are folded into that text by
//! [`ToolRegistry::invoke`], since the agent runtime has no separate error
//! channel.

pub mod cv;
pub mod form;
pub mod jobs;
pub mod ledger;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::JobpilotConfig;
use crate::error::{JobpilotError, Result};
use crate::jobs::JobSearchClient;
use crate::ledger::Ledger;
use crate::orchestrator::FormFillOrchestrator;

/// Shared handles injected into every tool call.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<JobpilotConfig>,
    pub ledger: Ledger,
    pub orchestrator: Arc<FormFillOrchestrator>,
    pub jobs: Arc<JobSearchClient>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;
    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String>;
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Form automation
        registry.register(Arc::new(form::FillFormTool));
        registry.register(Arc::new(form::RunStatusTool));

        // Job search
        registry.register(Arc::new(jobs::SearchJobsTool));
        registry.register(Arc::new(jobs::JobDetailsTool));

        // Application ledger
        registry.register(Arc::new(ledger::LogApplicationTool));
        registry.register(Arc::new(ledger::ExportApplicationsTool));

        // CV
        registry.register(Arc::new(cv::CreateTexTool));
        registry.register(Arc::new(cv::GreetTool));

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        self.tools.insert(name, tool);
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Run tool `name`. Only an unknown tool is an error; tool failures come
    /// back as descriptive text.
    pub async fn invoke(&self, ctx: &ToolContext, name: &str, params: Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| JobpilotError::UnknownTool(name.to_string()))?;

        info!(tool = name, "tool call");
        match tool.call(ctx, params).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(tool = name, "tool call failed: {e}");
                Ok(format!("{name} failed: {e}"))
            }
        }
    }
}

/// A string parameter that must be present and not blank. Returned untrimmed.
pub(crate) fn required_str(params: &Value, key: &str) -> Result<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            JobpilotError::InvalidParams(format!("missing required string parameter `{key}`"))
        })
}

pub(crate) fn optional_u64(params: &Value, key: &str) -> Result<Option<u64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            JobpilotError::InvalidParams(format!("parameter `{key}` must be a non-negative integer"))
        }),
    }
}
