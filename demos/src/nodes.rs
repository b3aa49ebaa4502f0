use anyhow::{Context as _, Result};
use ledger_testing_core::{constants, nodes::NodeClient};
use ledger_testing_env as tf_env;

/// Clients for `[staker, delegator]` from `LEDGER_STAKER_URI` and
/// `LEDGER_DELEGATOR_URI`.
pub fn staking_clients() -> Result<Vec<NodeClient>> {
    let staker = tf_env::ledger_staker_uri().context("LEDGER_STAKER_URI is not set")?;
    let delegator = tf_env::ledger_delegator_uri().context("LEDGER_DELEGATOR_URI is not set")?;
    let timeout = constants::rpc_timeout();

    Ok(vec![
        NodeClient::new("staker", &staker, timeout)
            .with_context(|| format!("invalid staker uri {staker}"))?,
        NodeClient::new("delegator", &delegator, timeout)
            .with_context(|| format!("invalid delegator uri {delegator}"))?,
    ])
}
