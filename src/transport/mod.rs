//! Transports: the protocol-neutral [`Transport`] trait and its factory
//!
//! A transport lists and invokes tools on one server over one wire
//! protocol. Implementations:
//!
//! - [`mcp::McpTransport`] -- one per MCP revision, selected by type
//!   parameter ([`mcp::V20241105`], [`mcp::V20250326`], [`mcp::V20250618`],
//!   [`mcp::V20251125`]).
//! - [`toolbox::ToolboxTransport`] -- the REST API.
//!
//! Use [`build_transport`] to pick one from a [`Protocol`].

pub mod http;
pub mod mcp;
pub mod toolbox;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::CallContext;
use crate::error::Result;
use crate::protocol::Protocol;
use crate::types::ManifestSchema;

use self::mcp::types::Implementation;
use self::mcp::{McpTransport, V20241105, V20250326, V20250618, V20251125};
use self::toolbox::ToolboxTransport;

/// Lists and invokes tools on a single server.
///
/// `headers` is the caller's resolved header map. It is applied to every
/// HTTP request the call makes, after the transport's own headers, and is
/// also used for a handshake triggered by the call.
///
/// Errors are [`anyhow::Error`] values whose root cause is a
/// [`crate::error::ToolboxError`].
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// The URL this transport talks to (canonical form).
    fn base_url(&self) -> &str;

    /// The protocol this transport speaks.
    fn protocol(&self) -> Protocol;

    /// Fetch the manifest of a single tool.
    ///
    /// # Errors
    ///
    /// [`crate::error::ToolboxError::ToolNotFound`] when the server does not
    /// know `tool_name`, plus any transport, protocol or handshake error.
    async fn get_tool(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ManifestSchema>;

    /// Fetch the manifest of a toolset; `""` names the default toolset.
    ///
    /// # Errors
    ///
    /// Any transport, protocol or handshake error, or a malformed tool
    /// definition.
    async fn list_tools(
        &self,
        ctx: &CallContext,
        toolset_name: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ManifestSchema>;

    /// Invoke `tool_name` with `payload` as its arguments.
    ///
    /// Returns the normalized result; `Value::Null` when the tool produced
    /// nothing.
    ///
    /// # Errors
    ///
    /// [`crate::error::ToolboxError::ToolExecution`] when the tool reports
    /// failure, plus any transport, protocol or handshake error.
    async fn invoke_tool(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        payload: &Value,
        headers: &HashMap<String, String>,
    ) -> Result<Value>;
}

/// Build the transport for `protocol` rooted at `base_url`.
///
/// No network I/O happens here; MCP transports handshake lazily on their
/// first call.
///
/// # Errors
///
/// Returns [`crate::error::ToolboxError::Config`] if `base_url` does not
/// parse.
///
/// # Examples
///
/// ```
/// use toolbox_transport::protocol::Protocol;
/// use toolbox_transport::transport::{build_transport, Transport};
///
/// let transport = build_transport(Protocol::Mcp, "http://localhost:5000", reqwest::Client::new()).unwrap();
/// assert_eq!(transport.protocol(), Protocol::Mcp20251125);
/// assert_eq!(transport.base_url(), "http://localhost:5000/mcp/");
/// ```
pub fn build_transport(
    protocol: Protocol,
    base_url: &str,
    http: reqwest::Client,
) -> Result<Arc<dyn Transport>> {
    build_transport_with_client_info(protocol, base_url, http, mcp::default_client_info())
}

/// Like [`build_transport`], with the identity MCP transports send in
/// `initialize`. REST ignores `client_info`.
///
/// # Errors
///
/// Returns [`crate::error::ToolboxError::Config`] if `base_url` does not
/// parse.
pub fn build_transport_with_client_info(
    protocol: Protocol,
    base_url: &str,
    http: reqwest::Client,
    client_info: Implementation,
) -> Result<Arc<dyn Transport>> {
    let transport: Arc<dyn Transport> = match protocol.resolve() {
        Protocol::Mcp20241105 => Arc::new(McpTransport::<V20241105>::with_client_info(
            base_url,
            http,
            client_info,
        )?),
        Protocol::Mcp20250326 => Arc::new(McpTransport::<V20250326>::with_client_info(
            base_url,
            http,
            client_info,
        )?),
        Protocol::Mcp20250618 => Arc::new(McpTransport::<V20250618>::with_client_info(
            base_url,
            http,
            client_info,
        )?),
        Protocol::Mcp20251125 | Protocol::Mcp => Arc::new(
            McpTransport::<V20251125>::with_client_info(base_url, http, client_info)?,
        ),
        Protocol::Toolbox => Arc::new(ToolboxTransport::new(base_url, http)?),
    };

    tracing::debug!(
        protocol = %transport.protocol(),
        url = %transport.base_url(),
        "Transport created"
    );
    Ok(transport)
}
