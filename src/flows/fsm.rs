use super::FlowKind;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Fallback,
}

// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Start,
    Validating,
    Invoking,
    Guarding,
    Done(Outcome),
}

// Pipeline signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSignal {
    Begin,
    InputAccepted,
    OutputReceived,
    OutputAccepted,
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Validating => f.write_str("validating"),
            Self::Invoking => f.write_str("invoking"),
            Self::Guarding => f.write_str("guarding"),
            Self::Done(Outcome::Success) => f.write_str("done(success)"),
            Self::Done(Outcome::Fallback) => f.write_str("done(fallback)"),
        }
    }
}

/// State of one pipeline execution. Never shared between calls.
#[derive(Debug)]
pub struct FlowMachine {
    flow: FlowKind,
    state: FlowState,
}

impl FlowMachine {
    pub fn new(flow: FlowKind) -> Self {
        Self {
            flow,
            state: FlowState::Start,
        }
    }

    pub fn current_state(&self) -> FlowState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, FlowState::Done(_))
    }

    pub fn transition(&mut self, signal: FlowSignal) -> Result<FlowState> {
        let new_state = match (self.state, signal) {
            (FlowState::Start, FlowSignal::Begin) => FlowState::Validating,
            (FlowState::Validating, FlowSignal::InputAccepted) => FlowState::Invoking,
            (FlowState::Invoking, FlowSignal::OutputReceived) => FlowState::Guarding,
            (FlowState::Guarding, FlowSignal::OutputAccepted) => FlowState::Done(Outcome::Success),
            (state, FlowSignal::Failed) if !matches!(state, FlowState::Done(_)) => {
                FlowState::Done(Outcome::Fallback)
            }
            (state, signal) => {
                warn!(
                    "Invalid {} transition from {} with signal {:?}",
                    self.flow, state, signal
                );
                return Err(Error::fsm(format!(
                    "Invalid transition from {} with signal {:?}",
                    state, signal
                )));
            }
        };

        debug!(
            "{} state transition: {} -> {} ({:?})",
            self.flow, self.state, new_state, signal
        );
        self.state = new_state;
        Ok(new_state)
    }
}
