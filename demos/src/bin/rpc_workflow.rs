use std::process;

use anyhow::{Context as _, Result};
use ledger_testing_core::scenario::{FailureClass, WorkflowExecutor};
use ledger_testing_workflows::{StakingRpcWorkflow, SubnetWorkflow, WorkflowConfig};
use runner_demos::{defaults, nodes};
use tracing::{info, warn};

const EXIT_SETUP: i32 = 1;
const EXIT_STEP: i32 = 2;
const EXIT_CONVERGENCE: i32 = 3;
const EXIT_CANCELLED: i32 = 4;

#[tokio::main]
async fn main() {
    defaults::init_tracing();

    match run().await {
        Ok(None) => info!("workflow complete"),
        Ok(Some(class)) => process::exit(exit_code(class)),
        Err(err) => {
            warn!("workflow demo failed: {err:#}");
            process::exit(EXIT_SETUP);
        }
    }
}

const fn exit_code(class: FailureClass) -> i32 {
    match class {
        FailureClass::StepExecution => EXIT_STEP,
        FailureClass::Convergence => EXIT_CONVERGENCE,
        FailureClass::Cancelled => EXIT_CANCELLED,
    }
}

async fn run() -> Result<Option<FailureClass>> {
    let config = WorkflowConfig::load_from_env()?
        .context("LEDGER_WORKFLOW_CONFIG must point at a workflow config file")?;
    let clients = nodes::staking_clients()?;

    let executor = WorkflowExecutor::new(&clients, config.execution_timeout());
    let cancel = executor.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling workflow");
            cancel.cancel();
        }
    });

    info!(
        staker = clients[0].label(),
        delegator = clients[1].label(),
        budget_secs = config.execution_timeout().as_secs(),
        "running staking workflow"
    );
    let outcome = StakingRpcWorkflow::from_config(&config)
        .run(&executor)
        .await
        .context("building staking scenario failed")?;
    if let Some(err) = &outcome.error {
        warn!(state = %outcome.state, completed = outcome.completed_steps, "staking workflow failed: {err}");
        return Ok(outcome.failure_class());
    }
    info!(
        validator_tx = outcome.data.validator_tx.as_deref().unwrap_or_default(),
        delegator_tx = outcome.data.delegator_tx.as_deref().unwrap_or_default(),
        "staking workflow done"
    );

    let Some(subnet) = config.subnet.clone() else {
        return Ok(None);
    };
    let outcome = SubnetWorkflow::new(config.user.clone(), subnet)
        .run(&executor)
        .await
        .context("building subnet scenario failed")?;
    if let Some(err) = &outcome.error {
        warn!(state = %outcome.state, "subnet workflow failed: {err}");
        return Ok(outcome.failure_class());
    }
    info!(
        subnet = outcome.data.subnet_id.as_deref().unwrap_or_default(),
        "subnet workflow done"
    );
    Ok(None)
}
