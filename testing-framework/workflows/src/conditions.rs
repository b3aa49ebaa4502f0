use std::future::Future;

use async_trait::async_trait;
use futures::future::join_all;
use ledger_testing_core::{
    nodes::{NodeClient, PlatformClient},
    rpc::CallError,
    scenario::{Convergence, DynError, WorkflowContext},
};
use thiserror::Error;
use tracing::debug;

use crate::subnet::SubnetState;

#[derive(Debug, Error)]
#[error("{node} query failed: {source}")]
struct NodeQueryError {
    node: String,
    #[source]
    source: CallError,
}

/// Queries every bound node concurrently; holds only when `probe` holds on
/// all of them. The first query error, in client order, is returned.
async fn on_every_node<'a, F, Fut>(ctx: &WorkflowContext<'a>, probe: F) -> Result<bool, DynError>
where
    F: Fn(&'a NodeClient) -> Fut,
    Fut: Future<Output = Result<bool, CallError>>,
{
    let checks = ctx.clients().iter().map(|client| {
        let check = probe(client);
        async move { (client.label(), check.await) }
    });

    let mut holds = true;
    for (node, result) in join_all(checks).await {
        match result {
            Ok(true) => {}
            Ok(false) => {
                debug!(node, "not visible yet");
                holds = false;
            }
            Err(source) => {
                return Err(NodeQueryError {
                    node: node.to_owned(),
                    source,
                }
                .into());
            }
        }
    }
    Ok(holds)
}

/// A validator appears in the pending or current set of every node.
pub struct ValidatorVisible {
    name: String,
    node_id: String,
    subnet_id: Option<String>,
}

impl ValidatorVisible {
    #[must_use]
    pub fn new(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            name: format!("validator {node_id} visible"),
            node_id,
            subnet_id: None,
        }
    }

    /// Look in `subnet_id`'s validator set instead of the primary network's.
    #[must_use]
    pub fn on_subnet(mut self, subnet_id: impl Into<String>) -> Self {
        let subnet_id = subnet_id.into();
        self.name = format!("validator {} visible on subnet {subnet_id}", self.node_id);
        self.subnet_id = Some(subnet_id);
        self
    }
}

async fn validator_listed(
    platform: &PlatformClient,
    subnet_id: Option<&str>,
    node_id: &str,
) -> Result<bool, CallError> {
    if platform
        .get_pending_validators(subnet_id)
        .await?
        .contains_validator(node_id)
    {
        return Ok(true);
    }
    Ok(platform
        .get_current_validators(subnet_id)
        .await?
        .contains_validator(node_id))
}

#[async_trait]
impl<S> Convergence<S> for ValidatorVisible
where
    S: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, ctx: &WorkflowContext<'_>, _state: &S) -> Result<bool, DynError> {
        let subnet_id = self.subnet_id.as_deref();
        on_every_node(ctx, |client| {
            validator_listed(client.platform(), subnet_id, &self.node_id)
        })
        .await
    }
}

/// A delegation to `node_id` appears in the pending or current set of every
/// node.
pub struct DelegatorVisible {
    name: String,
    node_id: String,
}

impl DelegatorVisible {
    #[must_use]
    pub fn new(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            name: format!("delegator of {node_id} visible"),
            node_id,
        }
    }
}

async fn delegator_listed(platform: &PlatformClient, node_id: &str) -> Result<bool, CallError> {
    if platform
        .get_pending_validators(None)
        .await?
        .contains_delegator(node_id)
    {
        return Ok(true);
    }
    Ok(platform
        .get_current_validators(None)
        .await?
        .contains_delegator(node_id))
}

#[async_trait]
impl<S> Convergence<S> for DelegatorVisible
where
    S: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, ctx: &WorkflowContext<'_>, _state: &S) -> Result<bool, DynError> {
        on_every_node(ctx, |client| {
            delegator_listed(client.platform(), &self.node_id)
        })
        .await
    }
}

/// The subnet created earlier in the run is listed by every node.
#[derive(Default)]
pub struct SubnetVisible;

#[async_trait]
impl Convergence<SubnetState> for SubnetVisible {
    fn name(&self) -> &str {
        "subnet visible"
    }

    async fn check(&self, ctx: &WorkflowContext<'_>, state: &SubnetState) -> Result<bool, DynError> {
        let subnet_id = state
            .subnet_id
            .as_deref()
            .ok_or("no subnet id was recorded by the creation step")?;
        let ids = vec![subnet_id.to_owned()];
        let ids = ids.as_slice();

        on_every_node(ctx, |client| async move {
            let subnets = client.platform().get_subnets(Some(ids)).await?;
            Ok::<_, CallError>(subnets.iter().any(|subnet| subnet.id == subnet_id))
        })
        .await
    }
}
