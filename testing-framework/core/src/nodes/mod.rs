mod admin;
mod node;
mod platform;
pub mod types;

use std::time::Duration;

pub use admin::AdminClient;
pub use node::NodeClient;
pub use platform::PlatformClient;
use serde::{Deserialize, Serialize};
pub use types::{
    Balance, Blockchain, Delegator, RewardOwner, SpendOptions, Stake, Status, Subnet, UserPass,
    Validator, ValidatorSet,
};

use crate::rpc::{CallResult, Endpoint, RpcClient, RpcError};

/// A typed client bound to one RPC namespace.
pub trait EndpointClient: Sized {
    /// Path prefix the namespace is served under.
    const PATH: &'static str;
    /// Namespace qualifying every method name.
    const NAMESPACE: &'static str;

    fn from_rpc(rpc: RpcClient) -> Self;

    fn rpc(&self) -> &RpcClient;

    #[must_use]
    fn endpoint(&self) -> &Endpoint {
        self.rpc().endpoint()
    }

    /// Construct against `base_address` with this client's default path and
    /// namespace.
    fn connect(base_address: &str, timeout: Duration) -> Result<Self, RpcError> {
        construct(base_address, Self::PATH, Self::NAMESPACE, timeout)
    }
}

/// Build any typed client from fully explicit endpoint configuration.
pub fn construct<C: EndpointClient>(
    base_address: &str,
    path_prefix: &str,
    namespace: &str,
    timeout: Duration,
) -> Result<C, RpcError> {
    Endpoint::new(base_address, path_prefix, namespace, timeout)
        .map(RpcClient::new)
        .map(C::from_rpc)
}

#[derive(Serialize)]
pub(crate) struct NoParams {}

#[derive(Deserialize)]
pub(crate) struct SuccessReply {
    pub success: bool,
}

#[derive(Deserialize)]
pub(crate) struct TxIdReply {
    #[serde(rename = "txID")]
    pub tx_id: String,
}

/// Identifiers handed back by the node must be non-empty.
pub(crate) fn non_empty_identifier(
    rpc: &RpcClient,
    method: &str,
    field: &str,
    value: String,
) -> CallResult<String> {
    if value.trim().is_empty() {
        return Err(rpc.context(
            rpc.endpoint().qualified_method(method),
            RpcError::Decode {
                reason: format!("`{field}` is empty"),
                source: None,
            },
        ));
    }
    Ok(value)
}
