use std::{error::Error as StdError, fmt, time::Duration};

use thiserror::Error;

use super::DynError;
use crate::rpc::{CallError, RpcErrorKind};

/// Position of a run in `Init -> Step(1..N) -> Verifying -> Done | Failed`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkflowState {
    Init,
    /// 1-based step index.
    Step(usize),
    Verifying,
    Done,
    Failed,
}

impl WorkflowState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Step(index) => write!(f, "step {index}"),
            Self::Verifying => f.write_str("verifying"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("scenario '{scenario}' cannot run: {reason}")]
    InvalidScenario { scenario: String, reason: String },
    #[error("step {index} '{step}' failed")]
    StepFailed {
        index: usize,
        step: String,
        #[source]
        source: DynError,
    },
    #[error("condition '{condition}' not observed within {waited:?}")]
    ConvergenceTimeout {
        condition: String,
        waited: Duration,
        #[source]
        last_error: Option<DynError>,
    },
    #[error("workflow cancelled during {phase}")]
    Cancelled { phase: WorkflowState },
}

/// What an operator has to look at after a failed run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// Setup or a step call failed; the cluster or the request is at fault.
    StepExecution,
    /// Every step went through but the network never showed the result.
    Convergence,
    Cancelled,
}

impl WorkflowError {
    #[must_use]
    pub const fn class(&self) -> FailureClass {
        match self {
            Self::InvalidScenario { .. } | Self::StepFailed { .. } => FailureClass::StepExecution,
            Self::ConvergenceTimeout { .. } => FailureClass::Convergence,
            Self::Cancelled { .. } => FailureClass::Cancelled,
        }
    }

    /// First RPC call failure in the source chain, if one caused this.
    #[must_use]
    pub fn call_error(&self) -> Option<&CallError> {
        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            if let Some(call) = err.downcast_ref::<CallError>() {
                return Some(call);
            }
            current = err.source();
        }
        None
    }

    #[must_use]
    pub fn rpc_kind(&self) -> Option<RpcErrorKind> {
        self.call_error().map(CallError::kind)
    }
}

/// Terminal report of one executor run.
#[derive(Debug)]
pub struct WorkflowOutcome<S> {
    /// `Done` or `Failed`.
    pub state: WorkflowState,
    pub completed_steps: usize,
    /// Every state entered, in order.
    pub history: Vec<WorkflowState>,
    /// Scenario data written by the steps that ran.
    pub data: S,
    pub error: Option<WorkflowError>,
}

impl<S> WorkflowOutcome<S> {
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.state, WorkflowState::Done)
    }

    #[must_use]
    pub fn failure_class(&self) -> Option<FailureClass> {
        self.error.as_ref().map(WorkflowError::class)
    }

    /// Converts into a `Result`, keeping the scenario data on success.
    pub fn into_result(self) -> Result<S, WorkflowError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}
