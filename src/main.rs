mod artifact;
mod bridge;
mod cli;
mod config;
mod error;
mod jobs;
mod ledger;
mod orchestrator;
mod registry;
mod server;
mod session;
mod state_machine;
#[cfg(test)]
mod testing;
mod tools;
mod ui;

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bridge::{AutomationCredentials, StagehandClient};
use cli::{Cli, Command};
use config::JobpilotConfig;
use jobs::JobSearchClient;
use ledger::Ledger;
use orchestrator::{FormFillOrchestrator, RunSettings};
use registry::RunRegistry;
use server::ServerState;
use session::{BrowserbaseClient, SessionManager};
use tools::{ToolContext, ToolRegistry};
use ui::RunProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("jobpilot=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobpilot=info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = JobpilotConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let config = Arc::new(config);

    match &cli.command {
        Command::Tools => {
            ui::print_tools(&ToolRegistry::with_defaults().schemas());
        }
        Command::Serve { .. } => {
            info!("Starting jobpilot v{}", env!("CARGO_PKG_VERSION"));
            let missing = config.missing_browser_credentials();
            if !missing.is_empty() {
                warn!(
                    "form filling is disabled until {} is set",
                    missing.join(", ")
                );
            }

            let state = ServerState {
                tools: ToolRegistry::with_defaults(),
                ctx: build_context(&config),
            };
            server::serve(Arc::new(state), &config.bind_addr).await?;
        }
        Command::Fill { url } => {
            let missing = config.missing_browser_credentials();
            if !missing.is_empty() {
                bail!("missing {}", missing.join(", "));
            }

            let orchestrator = build_orchestrator(&config);
            let progress = RunProgress::start(url);
            match orchestrator
                .run_foreground(url, |handle| progress.session_opened(handle))
                .await
            {
                Ok(record) => {
                    progress.complete(&record);
                    if cli.verbose {
                        progress.print_record(&record);
                    }
                }
                Err(e) => {
                    progress.fail(&e.to_string());
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

fn build_orchestrator(config: &JobpilotConfig) -> FormFillOrchestrator {
    let sessions = BrowserbaseClient::with_base_url(
        config.browserbase_api_key.clone(),
        config.browserbase_project_id.clone(),
        config.session_api_url.clone(),
    );
    let page = StagehandClient::with_base_url(
        AutomationCredentials {
            browserbase_api_key: config.browserbase_api_key.clone(),
            project_id: config.browserbase_project_id.clone(),
            model_api_key: config.model_api_key.clone(),
            model_name: config.model_name.clone(),
        },
        config.automation_api_url.clone(),
    );

    FormFillOrchestrator::new(
        SessionManager::new(Arc::new(sessions)),
        Arc::new(page),
        RunSettings::from_config(config),
        RunRegistry::new(),
        config.max_concurrent_sessions,
    )
}

fn build_context(config: &Arc<JobpilotConfig>) -> ToolContext {
    ToolContext {
        config: Arc::clone(config),
        ledger: Ledger::new(),
        orchestrator: Arc::new(build_orchestrator(config)),
        jobs: Arc::new(JobSearchClient::with_base_url(
            config.job_search_api_key.clone(),
            config.job_search_url.clone(),
        )),
    }
}
