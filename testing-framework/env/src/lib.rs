use std::{env, time::Duration};

#[must_use]
pub fn slow_test_env() -> bool {
    env::var("SLOW_TEST_ENV").is_ok_and(|s| s == "true")
}

/// Log filter directives, unset when empty.
#[must_use]
pub fn rust_log() -> Option<String> {
    non_empty_var("RUST_LOG")
}

/// Base URI of the node that stakes in workflow scenarios.
#[must_use]
pub fn ledger_staker_uri() -> Option<String> {
    non_empty_var("LEDGER_STAKER_URI")
}

/// Base URI of the node that delegates in workflow scenarios.
#[must_use]
pub fn ledger_delegator_uri() -> Option<String> {
    non_empty_var("LEDGER_DELEGATOR_URI")
}

/// Per-request RPC timeout, from `LEDGER_RPC_TIMEOUT_SECS`.
#[must_use]
pub fn ledger_rpc_timeout() -> Option<Duration> {
    parsed_var::<u64>("LEDGER_RPC_TIMEOUT_SECS").map(Duration::from_secs)
}

/// Convergence poll interval, from `LEDGER_POLL_INTERVAL_MS`.
#[must_use]
pub fn ledger_poll_interval() -> Option<Duration> {
    parsed_var::<u64>("LEDGER_POLL_INTERVAL_MS").map(Duration::from_millis)
}

/// Fraction of the execution budget granted to network acceptance.
#[must_use]
pub fn ledger_acceptance_timeout_ratio() -> Option<f64> {
    parsed_var::<f64>("LEDGER_ACCEPTANCE_TIMEOUT_RATIO")
        .filter(|ratio| ratio.is_finite() && *ratio > 0.0 && *ratio <= 1.0)
}

/// Total execution budget for a workflow, from `LEDGER_EXECUTION_TIMEOUT_SECS`.
#[must_use]
pub fn ledger_execution_timeout() -> Option<Duration> {
    parsed_var::<u64>("LEDGER_EXECUTION_TIMEOUT_SECS").map(Duration::from_secs)
}

/// Optional YAML file overriding workflow parameters.
#[must_use]
pub fn ledger_workflow_config() -> Option<String> {
    non_empty_var("LEDGER_WORKFLOW_CONFIG")
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
