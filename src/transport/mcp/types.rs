//! MCP wire payloads for the lifecycle and tool methods
//!
//! Struct fields are `camelCase` on the wire. Tool definitions inside a
//! `tools/list` result stay as raw JSON so the schema translator can report
//! malformed entries by index instead of failing the whole decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// JSON-RPC method constants
// ---------------------------------------------------------------------------

/// Lifecycle: client sends `initialize` to open a session.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Lifecycle: client sends `notifications/initialized` after the server ACKs.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
/// List the tools of a toolset.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Invoke a named tool.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

// ---------------------------------------------------------------------------
// Header constants
// ---------------------------------------------------------------------------

/// Session id header of the `2025-03-26` revision.
pub const HEADER_SESSION_ID: &str = "Mcp-Session-Id";
/// Protocol version header of the `2025-06-18` and later revisions.
pub const HEADER_PROTOCOL_VERSION: &str = "MCP-Protocol-Version";

// ---------------------------------------------------------------------------
// Metadata keys
// ---------------------------------------------------------------------------

/// `_meta` key mapping parameter names to their auth sources.
pub const META_AUTH_PARAM: &str = "toolbox/authParam";
/// `_meta` key listing the auth services required to invoke a tool.
pub const META_AUTH_INVOKE: &str = "toolbox/authInvoke";

// ---------------------------------------------------------------------------
// Initialize
// ---------------------------------------------------------------------------

/// Identifies a client or server implementation by name and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Short name of the implementation.
    pub name: String,
    /// Version string.
    #[serde(default)]
    pub version: String,
}

/// Capabilities a client advertises. This crate advertises none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCapabilities {}

/// Capabilities a server advertises.
///
/// Only `tools` is inspected; the others are kept for diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Server exposes `tools/list` and `tools/call`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    /// Server exposes prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Value>,
    /// Server exposes resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
    /// Server supports log notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Value>,
    /// Experimental capability extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
}

/// Parameters of the `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version the client claims.
    pub protocol_version: String,
    /// Capabilities advertised by the client.
    pub capabilities: ClientCapabilities,
    /// Client identity.
    pub client_info: Implementation,
}

/// Result of the `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version the server selected.
    pub protocol_version: String,
    /// Capabilities advertised by the server.
    #[serde(default)]
    pub capabilities: ServerCapabilities,
    /// Server identity.
    pub server_info: Implementation,
    /// Optional usage instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Result of `tools/list`. Definitions are translated one by one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    /// Raw tool definitions in server order.
    #[serde(default)]
    pub tools: Vec<Value>,
}

/// Parameters of `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Tool to invoke.
    pub name: String,
    /// Arguments object.
    pub arguments: Value,
}

/// One unit of a `tools/call` result.
///
/// Only `text` fragments take part in normalization; every other kind
/// (image, audio, embedded resource, ...) is kept as raw JSON and skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultFragment {
    /// `{"type": "text", "text": ...}`
    Text(TextFragment),
    /// Any fragment that is not text.
    Other(Value),
}

/// A `text` content fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub kind: TextKind,
    /// The payload.
    pub text: String,
}

/// Discriminator that only deserializes from `"text"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// `"text"`
    Text,
}

impl ResultFragment {
    /// Construct a text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        ResultFragment::Text(TextFragment {
            kind: TextKind::Text,
            text: text.into(),
        })
    }

    /// The text payload, for `text` fragments only.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResultFragment::Text(t) => Some(&t.text),
            ResultFragment::Other(_) => None,
        }
    }
}

/// Result of `tools/call`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Content fragments in order.
    #[serde(default)]
    pub content: Vec<ResultFragment>,
    /// When `true`, the tool signalled an error condition.
    #[serde(default)]
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initialize_params_wire_shape() {
        let params = InitializeParams {
            protocol_version: "2025-06-18".to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "toolbox-rust-sdk".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["protocolVersion"], "2025-06-18");
        assert_eq!(value["capabilities"], json!({}));
        assert_eq!(value["clientInfo"]["name"], "toolbox-rust-sdk");
    }

    #[test]
    fn test_initialize_result_without_tools_capability() {
        let result: InitializeResult = serde_json::from_value(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {"prompts": {}},
            "serverInfo": {"name": "toolbox", "version": "0.9.0"}
        }))
        .unwrap();
        assert!(result.capabilities.tools.is_none());
        assert!(result.capabilities.prompts.is_some());
    }

    #[test]
    fn test_call_result_mixed_fragments() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "image", "data": "AAAA", "mimeType": "image/png"},
                {"type": "text", "text": " world"}
            ]
        }))
        .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 3);
        assert_eq!(result.content[0].as_text(), Some("hello"));
        assert_eq!(result.content[1].as_text(), None);
        assert_eq!(result.content[2], ResultFragment::text(" world"));
    }
}
