use async_trait::async_trait;
use ledger_testing_core::{
    nodes::{SpendOptions, UserPass},
    scenario::{
        DynError, Scenario, ScenarioBuildError, ScenarioBuilder, Step, WorkflowContext,
        WorkflowExecutor, WorkflowOutcome,
    },
};
use tracing::info;

use crate::{conditions::SubnetVisible, config::SubnetSettings};

#[derive(Clone, Debug, Default)]
pub struct SubnetState {
    pub subnet_id: Option<String>,
}

/// Creates a subnet on the first node and waits until every node lists it.
#[derive(Clone, Debug)]
pub struct SubnetWorkflow {
    user: UserPass,
    settings: SubnetSettings,
}

impl SubnetWorkflow {
    #[must_use]
    pub const fn new(user: UserPass, settings: SubnetSettings) -> Self {
        Self { user, settings }
    }

    pub fn scenario(&self) -> Result<Scenario<SubnetState>, ScenarioBuildError> {
        ScenarioBuilder::new("subnet-workflow")
            .with_step(CreateSubnet {
                user: self.user.clone(),
                settings: self.settings.clone(),
            })
            .with_condition(SubnetVisible)
            .build()
    }

    pub async fn run(
        &self,
        executor: &WorkflowExecutor<'_>,
    ) -> Result<WorkflowOutcome<SubnetState>, ScenarioBuildError> {
        let scenario = self.scenario()?;
        Ok(executor.run(&scenario).await)
    }
}

struct CreateSubnet {
    user: UserPass,
    settings: SubnetSettings,
}

#[async_trait]
impl Step<SubnetState> for CreateSubnet {
    fn name(&self) -> &str {
        "create subnet"
    }

    async fn run(&self, ctx: &WorkflowContext<'_>, state: &mut SubnetState) -> Result<(), DynError> {
        let node = ctx.client(0)?;
        let tx_id = node
            .platform()
            .create_subnet(
                &self.user,
                &self.settings.control_keys,
                self.settings.threshold,
                &SpendOptions::default(),
            )
            .await?;
        info!(node = node.label(), subnet = %tx_id, "subnet creation accepted");

        // A subnet is identified by the id of the transaction that created it.
        state.subnet_id = Some(tx_id);
        Ok(())
    }
}
