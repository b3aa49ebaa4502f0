pub mod conditions;
pub mod config;
pub mod staking;
pub mod subnet;
pub mod util;

pub use conditions::{DelegatorVisible, SubnetVisible, ValidatorVisible};
pub use config::{ConfigError, StakingSettings, SubnetSettings, WorkflowConfig};
pub use staking::{StakingRpcWorkflow, StakingState};
pub use subnet::{SubnetState, SubnetWorkflow};
