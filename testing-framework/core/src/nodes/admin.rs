use serde::{Deserialize, Serialize};

use super::{EndpointClient, NoParams, SuccessReply};
use crate::{
    constants::{ADMIN_NAMESPACE, ADMIN_PATH},
    rpc::{CallResult, RpcClient, require_non_empty},
};

/// Client for the node administration API.
#[derive(Clone, Debug)]
pub struct AdminClient {
    rpc: RpcClient,
}

#[derive(Serialize)]
struct AliasParams<'a> {
    endpoint: &'a str,
    alias: &'a str,
}

#[derive(Serialize)]
struct AliasChainParams<'a> {
    chain: &'a str,
    alias: &'a str,
}

#[derive(Deserialize)]
struct StacktraceReply {
    stacktrace: String,
}

impl EndpointClient for AdminClient {
    const PATH: &'static str = ADMIN_PATH;
    const NAMESPACE: &'static str = ADMIN_NAMESPACE;

    fn from_rpc(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

impl AdminClient {
    pub async fn start_cpu_profiler(&self) -> CallResult<bool> {
        self.success("startCPUProfiler").await
    }

    pub async fn stop_cpu_profiler(&self) -> CallResult<bool> {
        self.success("stopCPUProfiler").await
    }

    /// Dump the heap profile on the node.
    pub async fn memory_profile(&self) -> CallResult<bool> {
        self.success("memoryProfile").await
    }

    /// Dump the mutex contention profile on the node.
    pub async fn lock_profile(&self) -> CallResult<bool> {
        self.success("lockProfile").await
    }

    /// Give the API `endpoint` an additional route `alias`.
    pub async fn alias(&self, endpoint: &str, alias: &str) -> CallResult<bool> {
        require_non_empty("endpoint", endpoint)
            .and_then(|()| require_non_empty("alias", alias))
            .map_err(|err| self.rpc.invalid("alias", err))?;

        let reply: SuccessReply = self
            .rpc
            .send("alias", &AliasParams { endpoint, alias })
            .await?;
        Ok(reply.success)
    }

    /// Give `chain` an additional name.
    pub async fn alias_chain(&self, chain: &str, alias: &str) -> CallResult<bool> {
        require_non_empty("chain", chain)
            .and_then(|()| require_non_empty("alias", alias))
            .map_err(|err| self.rpc.invalid("aliasChain", err))?;

        let reply: SuccessReply = self
            .rpc
            .send("aliasChain", &AliasChainParams { chain, alias })
            .await?;
        Ok(reply.success)
    }

    /// Goroutine dump of the node process.
    pub async fn stacktrace(&self) -> CallResult<String> {
        let reply: StacktraceReply = self.rpc.send("stacktrace", &NoParams {}).await?;
        Ok(reply.stacktrace)
    }

    async fn success(&self, method: &str) -> CallResult<bool> {
        let reply: SuccessReply = self.rpc.send(method, &NoParams {}).await?;
        Ok(reply.success)
    }
}
