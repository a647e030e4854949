mod run;
mod state;

pub use run::{AttachmentSkipped, FailureKind, OrchestrationRun, RunRecord, StepOutcome, TerminalState};
pub use state::{State, StateMachine, Transition};
