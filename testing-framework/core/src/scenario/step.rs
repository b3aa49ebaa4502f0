use async_trait::async_trait;

use super::{DynError, WorkflowContext};

#[async_trait]
/// One stage of a scenario. A step may fan calls out across nodes but only
/// returns once all of them have completed.
pub trait Step<S>: Send + Sync
where
    S: Send + Sync,
{
    fn name(&self) -> &str;

    /// Issue the step's calls, recording anything later stages need in
    /// `state`.
    async fn run(&self, ctx: &WorkflowContext<'_>, state: &mut S) -> Result<(), DynError>;
}
