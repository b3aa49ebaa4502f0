use std::time::Duration;

use reqwest::Url;

use super::RpcError;

/// Immutable address and call configuration of one RPC namespace on one node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    base_url: Url,
    path_prefix: String,
    namespace: String,
    timeout: Duration,
    url: Url,
}

impl Endpoint {
    /// Parse `base_address` and bind it to a path prefix and namespace.
    pub fn new(
        base_address: &str,
        path_prefix: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let base_url = Url::parse(base_address.trim()).map_err(|err| RpcError::Validation {
            argument: "base_address",
            reason: format!("'{base_address}' is not a valid URL: {err}"),
        })?;
        Self::from_url(base_url, path_prefix, namespace, timeout)
    }

    /// Bind an already parsed base URL.
    pub fn from_url(
        base_url: Url,
        path_prefix: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(RpcError::Validation {
                argument: "base_address",
                reason: format!("'{base_url}' must be an http(s) URL"),
            });
        }
        super::require_non_empty("namespace", namespace)?;
        if timeout.is_zero() {
            return Err(RpcError::Validation {
                argument: "timeout",
                reason: "must be non-zero".to_owned(),
            });
        }

        let url = join_path(&base_url, path_prefix);
        Ok(Self {
            base_url,
            path_prefix: path_prefix.to_owned(),
            namespace: namespace.trim().to_owned(),
            timeout,
            url,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Default deadline applied to each call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// `<namespace>.<method>`.
    #[must_use]
    pub fn qualified_method(&self, method: &str) -> String {
        format!("{}.{method}", self.namespace)
    }
}

fn join_path(base: &Url, prefix: &str) -> Url {
    let mut url = base.clone();
    let base_path = base.path().trim_end_matches('/');
    let prefix = prefix.trim().trim_matches('/');
    let path = if prefix.is_empty() {
        if base_path.is_empty() { "/".to_owned() } else { base_path.to_owned() }
    } else {
        format!("{base_path}/{prefix}")
    };
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    url
}
