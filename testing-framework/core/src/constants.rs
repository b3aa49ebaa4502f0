use std::time::Duration;

use ledger_testing_env as tf_env;

/// Path prefix of the administrative API.
pub const ADMIN_PATH: &str = "/ext/admin";

/// RPC namespace served under [`ADMIN_PATH`].
pub const ADMIN_NAMESPACE: &str = "admin";

/// Path prefix of the validator-chain API.
pub const PLATFORM_PATH: &str = "/ext/P";

/// RPC namespace served under [`PLATFORM_PATH`].
pub const PLATFORM_NAMESPACE: &str = "platform";

/// JSON-RPC protocol version placed in every envelope.
pub const JSON_RPC_VERSION: &str = "2.0";

/// Default per-request timeout for node RPC calls.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default interval between convergence polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Share of the total execution budget granted to network acceptance.
pub const DEFAULT_ACCEPTANCE_TIMEOUT_RATIO: f64 = 0.3;

/// Default total execution budget of a workflow scenario.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Resolve the RPC timeout from `LEDGER_RPC_TIMEOUT_SECS`, falling back to the
/// default.
pub fn rpc_timeout() -> Duration {
    crate::adjust_timeout(tf_env::ledger_rpc_timeout().unwrap_or(DEFAULT_RPC_TIMEOUT))
}

/// Resolve the poll interval from `LEDGER_POLL_INTERVAL_MS`, falling back to
/// the default.
pub fn poll_interval() -> Duration {
    tf_env::ledger_poll_interval().unwrap_or(DEFAULT_POLL_INTERVAL)
}

/// Resolve the acceptance ratio from `LEDGER_ACCEPTANCE_TIMEOUT_RATIO`.
pub fn acceptance_timeout_ratio() -> f64 {
    tf_env::ledger_acceptance_timeout_ratio().unwrap_or(DEFAULT_ACCEPTANCE_TIMEOUT_RATIO)
}

/// Resolve the execution budget from `LEDGER_EXECUTION_TIMEOUT_SECS`.
pub fn execution_timeout() -> Duration {
    crate::adjust_timeout(tf_env::ledger_execution_timeout().unwrap_or(DEFAULT_EXECUTION_TIMEOUT))
}
