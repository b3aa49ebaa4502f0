use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, Same, serde_as};

use crate::rpc::{RpcError, require_non_empty, require_non_empty_items};

/// Numbers the node may send either quoted or bare; always sent quoted.
pub(crate) type Lenient = PickFirst<(DisplayFromStr, Same)>;

/// Keystore credentials, flattened into the parameters of calls that act on
/// behalf of a user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserPass {
    pub username: String,
    pub password: String,
}

impl UserPass {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RpcError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

/// Funding selection for transaction-issuing calls. Empty or unset fields are
/// left out of the request so the node applies its defaults.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SpendOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<String>,
    #[serde(rename = "changeAddr", skip_serializing_if = "Option::is_none")]
    pub change_addr: Option<String>,
}

impl SpendOptions {
    #[must_use]
    pub fn from_addresses(mut self, from: Vec<String>) -> Self {
        self.from = from;
        self
    }

    #[must_use]
    pub fn change_to(mut self, address: impl Into<String>) -> Self {
        self.change_addr = Some(address.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), RpcError> {
        require_non_empty_items("from", &self.from)?;
        if let Some(change) = &self.change_addr {
            require_non_empty("changeAddr", change)?;
        }
        Ok(())
    }
}

/// Staking window and amount for a node. Times are unix seconds.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Stake {
    pub node_id: String,
    pub stake_amount: u64,
    pub start_time: u64,
    pub end_time: u64,
}

impl Stake {
    pub(crate) fn validate(&self) -> Result<(), RpcError> {
        require_non_empty("nodeID", &self.node_id)
    }
}

#[serde_as]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StakerParams<'a> {
    #[serde(rename = "nodeID")]
    pub node_id: &'a str,
    #[serde_as(as = "DisplayFromStr")]
    pub stake_amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub start_time: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub end_time: u64,
}

impl<'a> From<&'a Stake> for StakerParams<'a> {
    fn from(stake: &'a Stake) -> Self {
        Self {
            node_id: &stake.node_id,
            stake_amount: stake.stake_amount,
            start_time: stake.start_time,
            end_time: stake.end_time,
        }
    }
}

/// Balance snapshot of a validator-chain address.
#[serde_as]
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde_as(as = "Lenient")]
    pub balance: u64,
    #[serde_as(as = "Option<Lenient>")]
    pub unlocked: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub locked_stakeable: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub locked_not_stakeable: Option<u64>,
}

/// Owner of staking rewards.
#[serde_as]
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct RewardOwner {
    #[serde_as(as = "Option<Lenient>")]
    pub locktime: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Entry of a validator listing.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    #[serde(rename = "txID", default)]
    pub tx_id: Option<String>,
    #[serde(rename = "nodeID")]
    pub node_id: String,
    #[serde_as(as = "Lenient")]
    pub start_time: u64,
    #[serde_as(as = "Lenient")]
    pub end_time: u64,
    #[serde_as(as = "Option<Lenient>")]
    pub stake_amount: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub weight: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub potential_reward: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub delegation_fee: Option<f32>,
    #[serde(default)]
    pub reward_address: Option<String>,
    #[serde(default)]
    pub reward_owner: Option<RewardOwner>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde_as(as = "Option<Lenient>")]
    pub uptime: Option<f32>,
}

/// Entry of a delegator listing.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegator {
    #[serde(rename = "txID", default)]
    pub tx_id: Option<String>,
    #[serde(rename = "nodeID")]
    pub node_id: String,
    #[serde_as(as = "Lenient")]
    pub start_time: u64,
    #[serde_as(as = "Lenient")]
    pub end_time: u64,
    #[serde_as(as = "Option<Lenient>")]
    pub stake_amount: Option<u64>,
    #[serde_as(as = "Option<Lenient>")]
    pub potential_reward: Option<u64>,
    #[serde(default)]
    pub reward_address: Option<String>,
    #[serde(default)]
    pub reward_owner: Option<RewardOwner>,
}

/// Validators and delegators of a subnet, in server order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ValidatorSet {
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub delegators: Vec<Delegator>,
}

impl ValidatorSet {
    #[must_use]
    pub fn contains_validator(&self, node_id: &str) -> bool {
        self.validators.iter().any(|v| v.node_id == node_id)
    }

    #[must_use]
    pub fn contains_delegator(&self, node_id: &str) -> bool {
        self.delegators.iter().any(|d| d.node_id == node_id)
    }
}

/// Subnet descriptor.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub control_keys: Vec<String>,
    #[serde_as(as = "Lenient")]
    pub threshold: u32,
}

/// Blockchain descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Blockchain {
    pub id: String,
    pub name: String,
    #[serde(rename = "subnetID")]
    pub subnet_id: String,
    #[serde(rename = "vmID")]
    pub vm_id: String,
}

/// Lifecycle status of a transaction or blockchain as reported by the node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Status {
    Unknown,
    Preferred,
    Created,
    Validating,
    Syncing,
    Committed,
    Aborted,
    Processing,
    Dropped,
}
