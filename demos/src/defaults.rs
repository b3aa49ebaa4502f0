use ledger_testing_env as tf_env;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_FILTER: &str = "info";

/// Filters with `RUST_LOG`, falling back to `info` when it is unset or
/// unparsable.
pub fn init_tracing() {
    let filter = log_filter(tf_env::rust_log().as_deref());
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}
