//! Multi-node workflow execution.
//!
//! A [`Scenario`] is an ordered list of [`Step`]s followed by the
//! [`Convergence`] conditions that must eventually hold across the nodes.
//! [`WorkflowExecutor`] drives it through
//! `Init -> Step(1..N) -> Verifying -> Done | Failed`.

mod context;
mod convergence;
mod definition;
mod executor;
mod outcome;
mod step;

pub use context::{FanOutError, WorkflowContext, fan_out};
pub use convergence::Convergence;
pub use definition::{Scenario, ScenarioBuildError, ScenarioBuilder};
pub use executor::{CancelHandle, WorkflowExecutor};
pub use outcome::{FailureClass, WorkflowError, WorkflowOutcome, WorkflowState};
pub use step::Step;

/// Error type used by steps and conditions.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
