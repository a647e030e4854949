//! Command-line interface.
//!
//! `serve` runs the tool server, `fill` drives one form-fill run in the
//! foreground and `tools` prints the tool catalogue.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::JobpilotConfig;

/// Job application assistant: job search, CV writing and live form filling.
#[derive(Debug, Parser)]
#[command(name = "jobpilot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file (defaults to ./jobpilot.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum form actions executed per run.
    #[arg(long, global = true)]
    pub max_actions: Option<usize>,

    /// Seconds the browser stays open after the last action.
    #[arg(long, global = true)]
    pub settle_secs: Option<u64>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the tools over JSON-RPC.
    Serve {
        /// Address to listen on, overriding the configuration.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Fill one application form and wait for the run to finish.
    Fill {
        /// URL of the application form.
        url: String,
    },

    /// List the available tools.
    Tools,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut JobpilotConfig) {
        if let Some(max_actions) = self.max_actions {
            config.max_actions = max_actions;
        }
        if let Some(settle_secs) = self.settle_secs {
            config.settle_delay_secs = settle_secs;
        }
        if let Command::Serve { bind: Some(bind) } = &self.command {
            config.bind_addr = bind.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_fill_subcommand() {
        let cli = Cli::parse_from(["jobpilot", "fill", "https://jobs.example/apply"]);
        match cli.command {
            Command::Fill { url } => assert_eq!(url, "https://jobs.example/apply"),
            _ => panic!("expected Fill command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "jobpilot",
            "--config",
            "custom.toml",
            "--max-actions",
            "3",
            "--settle-secs",
            "0",
            "--verbose",
            "tools",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.max_actions, Some(3));
        assert_eq!(cli.settle_secs, Some(0));
        assert!(matches!(cli.command, Command::Tools));
    }

    #[test]
    fn overrides_apply_to_config() {
        let cli = Cli::parse_from([
            "jobpilot",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--max-actions",
            "2",
        ]);
        let mut config = JobpilotConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.max_actions, 2);
        assert_eq!(config.settle_delay_secs, 30);
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
