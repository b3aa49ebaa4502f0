use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use ledger_testing_core::{constants, nodes::UserPass};
use ledger_testing_env as tf_env;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_STAKE_AMOUNT: u64 = 2_000_000;
const DEFAULT_DELEGATION_AMOUNT: u64 = 1_000_000;
const DEFAULT_DELEGATION_FEE_RATE: f32 = 2.0;
const DEFAULT_START_DELAY_SECS: u64 = 30;
const DEFAULT_STAKING_PERIOD_SECS: u64 = 72 * 60 * 60;
const DEFAULT_SUBNET_THRESHOLD: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: `{field}` {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Workflow settings, usually loaded from a YAML file.
///
/// ```yaml
/// user:
///   username: staker
///   password: a-strong-password
/// staking:
///   funded_private_key: PrivateKey-...
///   node_id: NodeID-...
/// subnet:
///   control_keys: [P-local1...]
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct WorkflowConfig {
    /// Keystore user that exists on every node.
    pub user: UserPass,
    pub staking: StakingSettings,
    #[serde(default)]
    pub subnet: Option<SubnetSettings>,
    #[serde(default)]
    pub execution_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StakingSettings {
    /// Key holding the funds that back the stake.
    pub funded_private_key: String,
    /// Node id of the staker node.
    pub node_id: String,
    #[serde(default = "default_stake_amount")]
    pub stake_amount: u64,
    #[serde(default = "default_delegation_amount")]
    pub delegation_amount: u64,
    #[serde(default = "default_delegation_fee_rate")]
    pub delegation_fee_rate: f32,
    /// Seconds between issuing the transactions and the stake starting.
    #[serde(default = "default_start_delay_secs")]
    pub start_delay_secs: u64,
    #[serde(default = "default_staking_period_secs")]
    pub staking_period_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubnetSettings {
    pub control_keys: Vec<String>,
    #[serde(default = "default_subnet_threshold")]
    pub threshold: u32,
}

const fn default_stake_amount() -> u64 {
    DEFAULT_STAKE_AMOUNT
}

const fn default_delegation_amount() -> u64 {
    DEFAULT_DELEGATION_AMOUNT
}

const fn default_delegation_fee_rate() -> f32 {
    DEFAULT_DELEGATION_FEE_RATE
}

const fn default_start_delay_secs() -> u64 {
    DEFAULT_START_DELAY_SECS
}

const fn default_staking_period_secs() -> u64 {
    DEFAULT_STAKING_PERIOD_SECS
}

const fn default_subnet_threshold() -> u32 {
    DEFAULT_SUBNET_THRESHOLD
}

impl WorkflowConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `LEDGER_WORKFLOW_CONFIG`, if set.
    pub fn load_from_env() -> Result<Option<Self>, ConfigError> {
        tf_env::ledger_workflow_config()
            .map(|path| Self::load_from_file(Path::new(&path)))
            .transpose()
    }

    /// Total budget of a run; the file value wins over the environment.
    #[must_use]
    pub fn execution_timeout(&self) -> Duration {
        self.execution_timeout_secs
            .map_or_else(constants::execution_timeout, Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require("user.username", &self.user.username)?;
        require("user.password", &self.user.password)?;
        self.staking.validate()?;
        if let Some(subnet) = &self.subnet {
            subnet.validate()?;
        }
        if self.execution_timeout_secs == Some(0) {
            return Err(invalid("execution_timeout_secs", "must be non-zero"));
        }
        Ok(())
    }
}

impl StakingSettings {
    #[must_use]
    pub const fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_secs)
    }

    #[must_use]
    pub const fn staking_period(&self) -> Duration {
        Duration::from_secs(self.staking_period_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require("staking.funded_private_key", &self.funded_private_key)?;
        require("staking.node_id", &self.node_id)?;
        if self.stake_amount == 0 {
            return Err(invalid("staking.stake_amount", "must be non-zero"));
        }
        if self.delegation_amount == 0 {
            return Err(invalid("staking.delegation_amount", "must be non-zero"));
        }
        if !self.delegation_fee_rate.is_finite() || self.delegation_fee_rate < 0.0 {
            return Err(invalid(
                "staking.delegation_fee_rate",
                "must be a finite non-negative rate",
            ));
        }
        if self.staking_period_secs == 0 {
            return Err(invalid("staking.staking_period_secs", "must be non-zero"));
        }
        Ok(())
    }
}

impl SubnetSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.control_keys.is_empty() {
            return Err(invalid("subnet.control_keys", "must list at least one key"));
        }
        if self.control_keys.iter().any(|key| key.trim().is_empty()) {
            return Err(invalid("subnet.control_keys", "must not contain empty keys"));
        }
        let keys = u32::try_from(self.control_keys.len()).unwrap_or(u32::MAX);
        if self.threshold == 0 || self.threshold > keys {
            return Err(invalid(
                "subnet.threshold",
                format!("must be between 1 and {keys}"),
            ));
        }
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
