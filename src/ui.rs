//! Terminal output for the `fill` command: a spinner while the run is in
//! flight, then a coloured summary.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::orchestrator::RunHandle;
use crate::state_machine::{RunRecord, TerminalState};
use crate::tools::ToolSchema;

pub struct RunProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    cyan: Style,
}

impl RunProgress {
    pub fn start(target_url: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Opening browser session for {target_url}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            cyan: Style::new().cyan(),
        }
    }

    pub fn session_opened(&self, handle: &RunHandle) {
        self.pb.println(format!(
            "  {} Live view: {}",
            self.cyan.apply_to("●"),
            handle.live_view_url
        ));
        self.pb
            .set_message(format!("Filling form (run {})", handle.run_id));
    }

    pub fn complete(&self, record: &RunRecord) {
        self.pb.finish_and_clear();
        match &record.outcome {
            Some(TerminalState::Completed) => println!(
                "  {} Form filled: {} actions ({} failed), résumé {}",
                self.green.apply_to("✓"),
                record.actions_executed,
                record.actions_failed,
                if record.artifact_attached {
                    "attached"
                } else {
                    "not attached"
                }
            ),
            Some(TerminalState::Failed(kind)) => {
                println!("  {} Run failed: {kind}", self.red.apply_to("✗"))
            }
            None => println!("  {} Run did not finish", self.red.apply_to("✗")),
        }
    }

    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.red.apply_to("✗"));
    }

    pub fn print_record(&self, record: &RunRecord) {
        let style = if matches!(record.outcome, Some(TerminalState::Completed)) {
            &self.green
        } else {
            &self.red
        };
        println!();
        println!("{}", style.apply_to("─── Run Record ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}

/// Print the tool catalogue as it appears in a `tools/list` response.
pub fn print_tools(schemas: &[ToolSchema]) {
    println!(
        "{}",
        serde_json::to_string_pretty(schemas).unwrap_or_default()
    );
}
