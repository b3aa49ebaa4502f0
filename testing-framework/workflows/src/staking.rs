//! Stake a validator and delegate to it across two nodes.
//!
//! The staker node holds the funded key and issues both staking transactions;
//! the delegator node supplies the address that receives delegation rewards.
//! Verification waits until every node lists the validator and the
//! delegation.

use async_trait::async_trait;
use futures::{FutureExt as _, future::BoxFuture};
use ledger_testing_core::{
    nodes::{NodeClient, SpendOptions, Stake, UserPass},
    scenario::{
        DynError, Scenario, ScenarioBuildError, ScenarioBuilder, Step, WorkflowContext,
        WorkflowExecutor, WorkflowOutcome, fan_out,
    },
};
use tracing::info;

use crate::{
    conditions::{DelegatorVisible, ValidatorVisible},
    config::{StakingSettings, WorkflowConfig},
    util::StakeWindow,
};

/// Index of the staker node in the executor's client list.
pub const STAKER: usize = 0;
/// Index of the delegator node in the executor's client list.
pub const DELEGATOR: usize = 1;

/// Data produced while the workflow runs.
#[derive(Clone, Debug, Default)]
pub struct StakingState {
    /// Address of the imported funded key on the staker node.
    pub funded_address: Option<String>,
    /// Fresh address on the delegator node receiving delegation rewards.
    pub delegator_reward_address: Option<String>,
    pub window: Option<StakeWindow>,
    pub validator_tx: Option<String>,
    pub delegator_tx: Option<String>,
}

/// The staking RPC workflow over a staker and a delegator node.
#[derive(Clone, Debug)]
pub struct StakingRpcWorkflow {
    user: UserPass,
    settings: StakingSettings,
}

impl StakingRpcWorkflow {
    #[must_use]
    pub const fn new(user: UserPass, settings: StakingSettings) -> Self {
        Self { user, settings }
    }

    #[must_use]
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(config.user.clone(), config.staking.clone())
    }

    pub fn scenario(&self) -> Result<Scenario<StakingState>, ScenarioBuildError> {
        ScenarioBuilder::new("staking-rpc-workflow")
            .requires_clients(2)
            .with_step(PrepareAccounts {
                user: self.user.clone(),
                funded_private_key: self.settings.funded_private_key.clone(),
            })
            .with_step(AddValidator {
                user: self.user.clone(),
                settings: self.settings.clone(),
            })
            .with_step(AddDelegator {
                user: self.user.clone(),
                settings: self.settings.clone(),
            })
            .with_condition(ValidatorVisible::new(&self.settings.node_id))
            .with_condition(DelegatorVisible::new(&self.settings.node_id))
            .build()
    }

    /// Builds the scenario and runs it against `[staker, delegator, ..]`.
    pub async fn run(
        &self,
        executor: &WorkflowExecutor<'_>,
    ) -> Result<WorkflowOutcome<StakingState>, ScenarioBuildError> {
        let scenario = self.scenario()?;
        Ok(executor.run(&scenario).await)
    }
}

/// Imports the funded key on the staker while the delegator creates its
/// reward address.
struct PrepareAccounts {
    user: UserPass,
    funded_private_key: String,
}

#[async_trait]
impl Step<StakingState> for PrepareAccounts {
    fn name(&self) -> &str {
        "prepare accounts"
    }

    async fn run(&self, ctx: &WorkflowContext<'_>, state: &mut StakingState) -> Result<(), DynError> {
        let staker = ctx.client(STAKER)?.clone();
        let delegator = ctx.client(DELEGATOR)?.clone();
        let (staker_user, delegator_user) = (self.user.clone(), self.user.clone());
        let key = self.funded_private_key.clone();

        let calls: Vec<BoxFuture<'static, Result<String, DynError>>> = vec![
            async move {
                Ok(staker
                    .platform()
                    .import_key(&staker_user, &key)
                    .await?)
            }
            .boxed(),
            async move {
                Ok(delegator
                    .platform()
                    .create_address(&delegator_user)
                    .await?)
            }
            .boxed(),
        ];

        let mut addresses = fan_out(calls).await?.into_iter();
        let (Some(funded), Some(reward)) = (addresses.next(), addresses.next()) else {
            return Err("account preparation returned fewer results than calls".into());
        };
        info!(funded = %funded, reward = %reward, "accounts ready");

        state.funded_address = Some(funded);
        state.delegator_reward_address = Some(reward);
        Ok(())
    }
}

struct AddValidator {
    user: UserPass,
    settings: StakingSettings,
}

#[async_trait]
impl Step<StakingState> for AddValidator {
    fn name(&self) -> &str {
        "add validator"
    }

    async fn run(&self, ctx: &WorkflowContext<'_>, state: &mut StakingState) -> Result<(), DynError> {
        let staker = ctx.client(STAKER)?;
        let reward_address = recorded(&state.funded_address, "funded address")?;
        let window =
            StakeWindow::from_now(self.settings.start_delay(), self.settings.staking_period())?;
        let stake = stake(&self.settings.node_id, self.settings.stake_amount, window);

        let tx_id = staker
            .platform()
            .add_validator(
                &self.user,
                &stake,
                reward_address,
                self.settings.delegation_fee_rate,
                &SpendOptions::default(),
            )
            .await?;
        info!(node = staker.label(), %tx_id, start = window.start, end = window.end, "validator transaction accepted");

        state.window = Some(window);
        state.validator_tx = Some(tx_id);
        Ok(())
    }
}

struct AddDelegator {
    user: UserPass,
    settings: StakingSettings,
}

#[async_trait]
impl Step<StakingState> for AddDelegator {
    fn name(&self) -> &str {
        "add delegator"
    }

    async fn run(&self, ctx: &WorkflowContext<'_>, state: &mut StakingState) -> Result<(), DynError> {
        let staker = ctx.client(STAKER)?;
        let reward_address = recorded(&state.delegator_reward_address, "delegator address")?;
        let window = state
            .window
            .ok_or("validator window was not recorded by the previous step")?;
        let stake = stake(&self.settings.node_id, self.settings.delegation_amount, window);

        let tx_id = staker
            .platform()
            .add_delegator(&self.user, &stake, reward_address, &SpendOptions::default())
            .await?;
        info!(node = staker.label(), %tx_id, "delegator transaction accepted");

        state.delegator_tx = Some(tx_id);
        Ok(())
    }
}

fn stake(node_id: &str, amount: u64, window: StakeWindow) -> Stake {
    Stake {
        node_id: node_id.to_owned(),
        stake_amount: amount,
        start_time: window.start,
        end_time: window.end,
    }
}

fn recorded<'s>(value: &'s Option<String>, what: &str) -> Result<&'s str, DynError> {
    value
        .as_deref()
        .ok_or_else(|| format!("{what} was not recorded by an earlier step").into())
}

/// Runs the staking workflow against `clients` under the config's execution
/// budget.
pub async fn run_against(
    config: &WorkflowConfig,
    clients: &[NodeClient],
) -> Result<WorkflowOutcome<StakingState>, ScenarioBuildError> {
    let executor = WorkflowExecutor::new(clients, config.execution_timeout());
    StakingRpcWorkflow::from_config(config).run(&executor).await
}
