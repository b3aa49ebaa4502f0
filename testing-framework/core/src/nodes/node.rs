use std::time::Duration;

use reqwest::Client;

use super::{AdminClient, EndpointClient as _, PlatformClient};
use crate::{
    constants::{ADMIN_NAMESPACE, ADMIN_PATH, PLATFORM_NAMESPACE, PLATFORM_PATH},
    rpc::{Endpoint, RpcClient, RpcError},
};

/// Every typed client of a single node, sharing one connection pool.
#[derive(Clone, Debug)]
pub struct NodeClient {
    label: String,
    admin: AdminClient,
    platform: PlatformClient,
}

impl NodeClient {
    /// Build clients for the node reachable at `base_address`.
    pub fn new(
        label: impl Into<String>,
        base_address: &str,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let http = Client::new();
        let admin = Endpoint::new(base_address, ADMIN_PATH, ADMIN_NAMESPACE, timeout)?;
        let platform = Endpoint::new(base_address, PLATFORM_PATH, PLATFORM_NAMESPACE, timeout)?;

        Ok(Self {
            label: label.into(),
            admin: AdminClient::from_rpc(RpcClient::with_http_client(admin, http.clone())),
            platform: PlatformClient::from_rpc(RpcClient::with_http_client(platform, http)),
        })
    }

    /// Human-readable name used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn admin(&self) -> &AdminClient {
        &self.admin
    }

    #[must_use]
    pub const fn platform(&self) -> &PlatformClient {
        &self.platform
    }
}
