//! Generic JSON-RPC marshalling shared by every chain-specific client.
//!
//! A call builds a `{jsonrpc, method, params, id}` envelope, performs exactly
//! one HTTP POST against the endpoint URL under a deadline, and classifies the
//! outcome into a typed value or an [`RpcError`]. Retries are the caller's
//! business.

pub mod cb58;
mod client;
mod endpoint;
mod envelope;
mod error;

pub use client::RpcClient;
pub use endpoint::Endpoint;
pub use envelope::{RequestEnvelope, ResponseEnvelope, RpcErrorObject};
pub use error::{CallError, RpcError, RpcErrorKind};

/// Result of a typed client call.
pub type CallResult<T> = Result<T, CallError>;

/// Fails with [`RpcError::Validation`] when a required string argument is
/// empty or whitespace.
pub fn require_non_empty(argument: &'static str, value: &str) -> Result<(), RpcError> {
    if value.trim().is_empty() {
        return Err(RpcError::Validation {
            argument,
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

/// Fails with [`RpcError::Validation`] when any entry of a required list is
/// empty.
pub fn require_non_empty_items(argument: &'static str, values: &[String]) -> Result<(), RpcError> {
    if let Some(idx) = values.iter().position(|value| value.trim().is_empty()) {
        return Err(RpcError::Validation {
            argument,
            reason: format!("entry {idx} must not be empty"),
        });
    }
    Ok(())
}
