use std::time::Duration;

use async_trait::async_trait;

use super::{DynError, WorkflowContext};

#[async_trait]
/// A read-only post-condition polled until it holds or the scenario deadline
/// passes.
pub trait Convergence<S>: Send + Sync
where
    S: Send + Sync,
{
    fn name(&self) -> &str;

    /// `Ok(false)` means "not yet". Errors are treated the same way but are
    /// kept for the timeout report.
    async fn check(&self, ctx: &WorkflowContext<'_>, state: &S) -> Result<bool, DynError>;

    /// Overrides the executor's poll interval for this condition.
    fn poll_interval(&self) -> Option<Duration> {
        None
    }
}
