use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;
use crate::constants::JSON_RPC_VERSION;

/// Outgoing request body.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a, P: ?Sized> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: &'a P,
    pub id: u32,
}

impl<'a, P: Serialize + ?Sized> RequestEnvelope<'a, P> {
    #[must_use]
    pub fn new(method: String, params: &'a P, id: u32) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION,
            method,
            params,
            id,
        }
    }
}

/// Error object carried by a failed response, kept verbatim.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Incoming response body before the result is coerced into its final type.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl ResponseEnvelope {
    /// Splits the envelope into its success payload or classified error.
    ///
    /// A present, non-null id must match the request before anything else is
    /// looked at. A response must carry exactly one of `result` and `error`; a
    /// `null` result counts as absent.
    pub fn into_result(self, expected_id: u32) -> Result<Value, RpcError> {
        if let Some(id) = self.id.as_ref().filter(|id| !id.is_null()) {
            if !id_matches(id, expected_id) {
                return Err(RpcError::decode(format!(
                    "response id {id} does not match request id {expected_id}"
                )));
            }
        }

        match (self.result, self.error) {
            (Some(_), Some(_)) => Err(RpcError::decode(
                "response carries both a result and an error",
            )),
            (None, Some(error)) => Err(RpcError::Application {
                code: error.code,
                message: error.message,
                data: error.data,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::decode(
                "response carries neither a result nor an error",
            )),
        }
    }
}

fn id_matches(id: &Value, expected: u32) -> bool {
    match id {
        Value::Number(number) => number.as_u64() == Some(u64::from(expected)),
        Value::String(text) => text.parse::<u64>().ok() == Some(u64::from(expected)),
        _ => false,
    }
}
