//! JSON-RPC 2.0 envelope codec
//!
//! Builds requests and notifications, and unwraps responses. Nothing here
//! depends on the MCP revision in use.
//!
//! Every request carries a fresh UUID v4 correlation id; notifications never
//! carry one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolboxError;

/// JSON-RPC protocol tag
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON sent is not a valid request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// A JSON-RPC 2.0 request object.
///
/// # Examples
///
/// ```
/// use toolbox_transport::transport::mcp::jsonrpc::JsonRpcRequest;
///
/// let req = JsonRpcRequest::new("tools/list", None);
/// assert_eq!(req.jsonrpc, "2.0");
/// assert!(!req.id.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol tag; always `"2.0"`.
    pub jsonrpc: String,
    /// Correlation id echoed by the response.
    pub id: String,
    /// Method name to invoke.
    pub method: String,
    /// Optional method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a request with a newly generated correlation id.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 notification (a request with no `id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol tag; always `"2.0"`.
    pub jsonrpc: String,
    /// Notification method name.
    pub method: String,
    /// Optional notification parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a notification.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable error description.
    pub message: String,
    /// Optional additional error context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result` or `error` is present in a valid response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol tag; always `"2.0"`.
    pub jsonrpc: String,
    /// Mirrors the id of the corresponding request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Successful result; mutually exclusive with `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object; mutually exclusive with `result`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Unwrap the response to request `expected_id`.
    ///
    /// A missing or `null` id is accepted; a different id is not.
    ///
    /// # Errors
    ///
    /// - [`ToolboxError::ResponseIdMismatch`] when the echoed id differs.
    /// - [`ToolboxError::Rpc`] when the envelope carries an error object.
    pub fn into_result(self, expected_id: &str) -> std::result::Result<Value, ToolboxError> {
        match &self.id {
            None | Some(Value::Null) => {}
            Some(Value::String(id)) if id == expected_id => {}
            Some(other) => {
                let actual = match other {
                    Value::String(s) => s.clone(),
                    v => v.to_string(),
                };
                return Err(ToolboxError::ResponseIdMismatch {
                    expected: expected_id.to_string(),
                    actual,
                });
            }
        }

        if let Some(error) = self.error {
            return Err(ToolboxError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Serialize any envelope to a JSON body.
///
/// # Errors
///
/// Returns [`ToolboxError::Marshal`] if serialization fails.
pub fn encode<T: Serialize>(envelope: &T) -> std::result::Result<Vec<u8>, ToolboxError> {
    serde_json::to_vec(envelope).map_err(|e| ToolboxError::Marshal(e.to_string()))
}

/// Parse a response body.
///
/// # Errors
///
/// Returns [`ToolboxError::Unmarshal`] if the body is not a JSON-RPC
/// response.
pub fn decode_response(body: &str) -> std::result::Result<JsonRpcResponse, ToolboxError> {
    serde_json::from_str(body)
        .map_err(|e| ToolboxError::Unmarshal(format!("invalid JSON-RPC response: {}", e)))
}

/// Deserialize a JSON-RPC `result` into a typed payload.
///
/// # Errors
///
/// Returns [`ToolboxError::Unmarshal`] if `result` has the wrong shape.
pub fn decode_result<R: serde::de::DeserializeOwned>(
    method: &str,
    result: Value,
) -> std::result::Result<R, ToolboxError> {
    serde_json::from_value(result)
        .map_err(|e| ToolboxError::Unmarshal(format!("invalid '{}' result: {}", method, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_ids_are_unique() {
        let a = JsonRpcRequest::new("tools/list", None);
        let b = JsonRpcRequest::new("tools/list", None);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(
            "tools/call",
            Some(json!({"name": "echo", "arguments": {"x": 1}})),
        );
        let value: Value = serde_json::from_slice(&encode(&req).unwrap()).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "tools/call");
        assert_eq!(value["id"], req.id.as_str());
        assert_eq!(value["params"]["name"], "echo");
    }

    #[test]
    fn test_notification_has_no_id() {
        let n = JsonRpcNotification::new("notifications/initialized", Some(json!({})));
        let value: Value = serde_json::from_slice(&encode(&n).unwrap()).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "notifications/initialized");
    }

    #[test]
    fn test_into_result_success() {
        let resp = decode_response(r#"{"jsonrpc":"2.0","id":"abc","result":{"tools":[]}}"#)
            .unwrap();
        assert_eq!(resp.into_result("abc").unwrap(), json!({"tools": []}));
    }

    #[test]
    fn test_into_result_error_keeps_server_message() {
        let resp = decode_response(
            r#"{"jsonrpc":"2.0","id":"abc","error":{"code":-32601,"message":"no handler for tools/frob"}}"#,
        )
        .unwrap();
        assert_eq!(
            resp.into_result("abc").unwrap_err(),
            ToolboxError::Rpc {
                code: error_codes::METHOD_NOT_FOUND,
                message: "no handler for tools/frob".to_string(),
            }
        );
    }

    #[test]
    fn test_into_result_rejects_foreign_id() {
        let resp = decode_response(r#"{"jsonrpc":"2.0","id":7,"result":{}}"#).unwrap();
        let err = resp.into_result("abc").unwrap_err();
        assert_eq!(
            err,
            ToolboxError::ResponseIdMismatch {
                expected: "abc".to_string(),
                actual: "7".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_result_is_null() {
        let resp = decode_response(r#"{"jsonrpc":"2.0","id":null}"#).unwrap();
        assert_eq!(resp.into_result("abc").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_garbage_is_unmarshal_error() {
        assert!(matches!(
            decode_response("<html>oops</html>"),
            Err(ToolboxError::Unmarshal(_))
        ));
    }
}
