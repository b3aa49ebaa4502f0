use std::{fmt, time::Duration};

use reqwest::{StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

/// Coarse classification of an [`RpcError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RpcErrorKind {
    /// Connection or protocol failure, including non-success HTTP statuses.
    Transport,
    /// Transport failure caused by the request deadline elapsing.
    Timeout,
    /// Malformed or type-mismatched payload.
    Decode,
    /// Well-formed error object returned by the server.
    Application,
    /// Caller argument rejected before any network traffic.
    Validation,
}

impl RpcErrorKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
            Self::Application => "application",
            Self::Validation => "validation",
        }
    }

    /// Timeouts are a distinguished kind of transport failure.
    #[must_use]
    pub const fn is_transport(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout)
    }
}

impl fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single remote call, raised where it is detected.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport failure: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("no response within {timeout:?}")]
    Timeout {
        timeout: Duration,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response: {reason}")]
    Decode {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },
    #[error("server error {code}: {message}")]
    Application {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("invalid argument `{argument}`: {reason}")]
    Validation {
        argument: &'static str,
        reason: String,
    },
}

impl RpcError {
    #[must_use]
    pub const fn kind(&self) -> RpcErrorKind {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } => RpcErrorKind::Transport,
            Self::Timeout { .. } => RpcErrorKind::Timeout,
            Self::Decode { .. } => RpcErrorKind::Decode,
            Self::Application { .. } => RpcErrorKind::Application,
            Self::Validation { .. } => RpcErrorKind::Validation,
        }
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn decode_json(reason: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            reason: reason.into(),
            source: Some(source),
        }
    }

    pub(crate) fn from_reqwest(source: reqwest::Error, timeout: Duration) -> Self {
        if source.is_timeout() {
            Self::Timeout { timeout, source }
        } else {
            Self::Transport { source }
        }
    }

    /// Server error code, when the server answered with an error object.
    #[must_use]
    pub const fn application_code(&self) -> Option<i64> {
        match self {
            Self::Application { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// An [`RpcError`] annotated with the call site it was raised from.
#[derive(Debug, Error)]
#[error("{method} on {url} failed: {source}")]
pub struct CallError {
    method: String,
    url: Url,
    #[source]
    source: RpcError,
}

impl CallError {
    #[must_use]
    pub const fn new(method: String, url: Url, source: RpcError) -> Self {
        Self {
            method,
            url,
            source,
        }
    }

    /// Namespace-qualified method name, e.g. `platform.addValidator`.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn kind(&self) -> RpcErrorKind {
        self.source.kind()
    }

    #[must_use]
    pub const fn rpc_error(&self) -> &RpcError {
        &self.source
    }
}
