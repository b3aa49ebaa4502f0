use std::{sync::Arc, time::Duration};

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use super::{CallError, Endpoint, RequestEnvelope, ResponseEnvelope, RpcError};

const MAX_BODY_EXCERPT: usize = 256;

/// Transport and codec bound to a single [`Endpoint`].
///
/// Holds no per-call state, so clones can be used concurrently without
/// coordination.
#[derive(Clone, Debug)]
pub struct RpcClient {
    endpoint: Arc<Endpoint>,
    http: Client,
}

impl RpcClient {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_http_client(endpoint, Client::new())
    }

    /// Share an existing connection pool between endpoints of the same node.
    #[must_use]
    pub fn with_http_client(endpoint: Endpoint, http: Client) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            http,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Call `method` under the endpoint's default timeout.
    pub async fn send<P, R>(&self, method: &str, params: &P) -> Result<R, CallError>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        self.send_with_timeout(method, params, self.endpoint.timeout())
            .await
    }

    /// Call `method` once under an explicit deadline.
    pub async fn send_with_timeout<P, R>(
        &self,
        method: &str,
        params: &P,
        timeout: Duration,
    ) -> Result<R, CallError>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let qualified = self.endpoint.qualified_method(method);
        self.call(&qualified, params, timeout)
            .await
            .and_then(|value| {
                serde_json::from_value(value).map_err(|err| {
                    RpcError::decode_json(
                        format!("result does not match the expected shape: {err}"),
                        err,
                    )
                })
            })
            .map_err(|source| self.context(qualified, source))
    }

    /// Attach this endpoint's call-site context to an error raised outside
    /// the transport, such as argument validation.
    #[must_use]
    pub fn context(&self, qualified_method: String, source: RpcError) -> CallError {
        warn!(
            method = %qualified_method,
            url = %self.endpoint.url(),
            kind = %source.kind(),
            error = %source,
            "rpc call failed"
        );
        CallError::new(qualified_method, self.endpoint.url().clone(), source)
    }

    /// Reject a call before it reaches the network.
    pub fn invalid(&self, method: &str, source: RpcError) -> CallError {
        self.context(self.endpoint.qualified_method(method), source)
    }

    async fn call<P>(&self, method: &str, params: &P, timeout: Duration) -> Result<Value, RpcError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let id = rand::random::<u32>();
        let envelope = RequestEnvelope::new(method.to_owned(), params, id);
        debug!(method, url = %self.endpoint.url(), id, "sending rpc request");

        let response = self
            .http
            .post(self.endpoint.url().clone())
            .timeout(timeout)
            .json(&envelope)
            .send()
            .await
            .map_err(|err| RpcError::from_reqwest(err, timeout))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RpcError::from_reqwest(err, timeout))?;

        let parsed = serde_json::from_slice::<ResponseEnvelope>(&body);
        if !status.is_success() {
            return match parsed {
                Ok(envelope) if envelope.error.is_some() => envelope.into_result(id),
                _ => Err(RpcError::HttpStatus {
                    status,
                    body: excerpt(&body),
                }),
            };
        }

        parsed
            .map_err(|err| RpcError::decode_json(format!("body is not a JSON-RPC envelope: {err}"), err))?
            .into_result(id)
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_BODY_EXCERPT {
        return trimmed.to_owned();
    }
    let mut short: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
    short.push('…');
    short
}
