use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::run::{OrchestrationRun, StepOutcome, TerminalState};

/// States of a form-fill run.
///
/// A run flows through: INIT → NAVIGATING → FETCHING_ARTIFACT →
/// ATTACHING_ARTIFACT → OBSERVING_ACTIONS → EXECUTING_ACTIONS → SETTLING → CLOSED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Init,
    Navigating,
    FetchingArtifact,
    AttachingArtifact,
    ObservingActions,
    ExecutingActions,
    Settling,
    Closed,
}

impl State {
    fn successor(self) -> State {
        match self {
            State::Init => State::Navigating,
            State::Navigating => State::FetchingArtifact,
            State::FetchingArtifact => State::AttachingArtifact,
            State::AttachingArtifact => State::ObservingActions,
            State::ObservingActions => State::ExecutingActions,
            State::ExecutingActions => State::Settling,
            State::Settling | State::Closed => State::Closed,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == State::Closed
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Init => write!(f, "INIT"),
            State::Navigating => write!(f, "NAVIGATING"),
            State::FetchingArtifact => write!(f, "FETCHING_ARTIFACT"),
            State::AttachingArtifact => write!(f, "ATTACHING_ARTIFACT"),
            State::ObservingActions => write!(f, "OBSERVING_ACTIONS"),
            State::ExecutingActions => write!(f, "EXECUTING_ACTIONS"),
            State::Settling => write!(f, "SETTLING"),
            State::Closed => write!(f, "CLOSED"),
        }
    }
}

/// The result of evaluating a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Advance to the next state.
    Next(State),
    /// The run reached `Closed` with the given terminal state.
    Close(TerminalState),
}

/// Drives an `OrchestrationRun` through the state machine.
pub struct StateMachine;

impl StateMachine {
    /// Compute and apply the next transition for `run` given the outcome of
    /// the step performed in its current state.
    ///
    /// - Success advances to the following state; success in `Settling`
    ///   closes the run as `Completed`.
    /// - Failure in any state closes the run as `Failed`.
    /// - Once closed, the run is immutable and the recorded terminal state is
    ///   returned again.
    pub fn next(run: &mut OrchestrationRun, outcome: StepOutcome) -> Transition {
        if let Some(terminal) = &run.terminal_state {
            return Transition::Close(terminal.clone());
        }

        let transition = match (run.state, outcome) {
            (State::Settling, StepOutcome::Success) => Transition::Close(TerminalState::Completed),
            (state, StepOutcome::Success) => Transition::Next(state.successor()),
            (_, StepOutcome::Failure(kind)) => Transition::Close(TerminalState::Failed(kind)),
        };

        run.state_history.push(run.state);
        match &transition {
            Transition::Next(next_state) => run.state = *next_state,
            Transition::Close(terminal) => {
                run.state = State::Closed;
                run.terminal_state = Some(terminal.clone());
            }
        }
        run.updated_at = Utc::now();

        transition
    }
}
