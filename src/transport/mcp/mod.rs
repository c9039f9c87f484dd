//! MCP transports over Streamable-HTTP-style JSON-RPC POSTs
//!
//! This module holds everything the protocol revisions share:
//!
//! - [`Connection`] -- canonical endpoint URL, HTTP client, client identity
//!   and the single-flight [`HandshakeGate`] holding the committed
//!   [`Session`].
//! - [`ProtocolRevision`] -- the strategy each revision implements: its
//!   handshake procedure and its per-request framing (headers).
//! - [`McpTransport`] -- the generic [`Transport`] implementation, selected
//!   at construction time by its revision type parameter.
//!
//! # Module Layout
//!
//! - `jsonrpc`   -- envelope codec
//! - `types`     -- `initialize` / `tools/*` payloads
//! - `schema`    -- tool definition translation
//! - `content`   -- `tools/call` result normalization
//! - `gate`      -- run-once handshake gate
//! - `v20241105`, `v20250326`, `v20250618`, `v20251125` -- the revisions
//!
//! # Request flow
//!
//! ```text
//! list_tools / invoke_tool
//!   -> ensure_ready (gate; handshake once per connection)
//!   -> JsonRpcRequest (fresh UUID id)
//!   -> POST, framed by the revision, caller headers applied last
//!   -> status check (200 body / 202,204 ack / other -> HttpStatus)
//!   -> JsonRpcResponse::into_result
//!   -> schema translation (list) or content normalization (invoke)
//! ```

pub mod content;
pub mod gate;
pub mod jsonrpc;
pub mod schema;
pub mod types;
pub mod v20241105;
pub mod v20250326;
pub mod v20250618;
pub mod v20251125;

use std::collections::HashMap;
use std::fmt;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::context::CallContext;
use crate::error::{Result, ToolboxError};
use crate::protocol::Protocol;
use crate::transport::http::{self, InsecureHttpWarning};
use crate::transport::Transport;
use crate::types::ManifestSchema;

use self::gate::{HandshakeGate, HandshakeState};
use self::jsonrpc::{JsonRpcNotification, JsonRpcRequest};
use self::types::{
    CallToolParams, CallToolResult, ClientCapabilities, Implementation, InitializeParams,
    InitializeResult, ListToolsResult, METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_TOOLS_CALL,
    METHOD_TOOLS_LIST,
};

pub use self::v20241105::V20241105;
pub use self::v20250326::V20250326;
pub use self::v20250618::V20250618;
pub use self::v20251125::V20251125;

/// Client name sent in `initialize`.
pub const CLIENT_NAME: &str = "toolbox-rust-sdk";

/// Endpoint path segment appended to the server base URL.
const MCP_PATH_SEGMENT: &str = "mcp";

/// The default client identity: [`CLIENT_NAME`] at this crate's version.
pub fn default_client_info() -> Implementation {
    Implementation {
        name: CLIENT_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Resolve `base_url` to the canonical MCP endpoint `{base}/mcp/`.
///
/// Idempotent: trailing slashes and an existing `/mcp` suffix collapse to
/// the same result.
///
/// # Examples
///
/// ```
/// use toolbox_transport::transport::mcp::normalize_mcp_url;
///
/// let canonical = "http://localhost:5000/mcp/";
/// assert_eq!(normalize_mcp_url("http://localhost:5000"), canonical);
/// assert_eq!(normalize_mcp_url("http://localhost:5000/"), canonical);
/// assert_eq!(normalize_mcp_url("http://localhost:5000/mcp"), canonical);
/// assert_eq!(normalize_mcp_url(canonical), canonical);
/// ```
pub fn normalize_mcp_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    let root = trimmed
        .strip_suffix(MCP_PATH_SEGMENT)
        .and_then(|rest| rest.strip_suffix('/'))
        .unwrap_or(trimmed);
    format!("{}/{}/", root, MCP_PATH_SEGMENT)
}

// ---------------------------------------------------------------------------
// ProtocolRevision
// ---------------------------------------------------------------------------

/// What one MCP revision contributes on top of the shared [`Connection`].
///
/// Implementations are zero-sized strategy types; [`McpTransport`] is
/// generic over them so a transport can never exist without its revision.
#[async_trait]
pub trait ProtocolRevision: Send + Sync + fmt::Debug + 'static {
    /// The [`Protocol`] variant this revision implements.
    fn protocol(&self) -> Protocol;

    /// The version string claimed in `initialize`.
    fn protocol_version(&self) -> &'static str {
        self.protocol()
            .protocol_version()
            .unwrap_or(crate::protocol::LATEST_PROTOCOL_VERSION)
    }

    /// Add this revision's headers to an outbound POST.
    ///
    /// Called for every request and notification, after `Content-Type` and
    /// before the caller's headers. `session` is `None` only for
    /// `initialize`.
    fn frame(
        &self,
        conn: &Connection,
        session: Option<&Session>,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder;

    /// Run the handshake and return what it established.
    ///
    /// Must not record anything on `conn`; the returned [`Session`] becomes
    /// visible only once the gate commits it.
    ///
    /// # Errors
    ///
    /// Any error ends the handshake; the gate caches it unless it is a
    /// cancellation.
    async fn handshake(
        &self,
        conn: &Connection,
        ctx: &CallContext,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<Session, ToolboxError>;
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// What a successful handshake established.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Server implementation version from `initialize`.
    pub server_version: String,
    /// Session id issued by the server, for session-bearing revisions.
    pub session_id: Option<String>,
}

/// A successful JSON-RPC exchange: the unwrapped `result` plus the HTTP
/// response headers it arrived with.
#[derive(Debug, Clone)]
pub struct RpcReply {
    /// The `result` member of the response.
    pub result: Value,
    /// Response headers (the session id travels here).
    pub headers: HeaderMap,
}

/// Per-client connection state shared by every call on one transport.
///
/// The [`Session`] lives in the gate and is readable only after the
/// handshake has been committed.
pub struct Connection {
    base_url: String,
    http: reqwest::Client,
    protocol_version: &'static str,
    client_info: Implementation,
    gate: HandshakeGate<Session>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("protocol_version", &self.protocol_version)
            .field("server_version", &self.server_version())
            .field("has_session", &self.session_id().is_some())
            .field("state", &self.gate.state())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create a connection to `base_url` (normalized to `{base}/mcp/`).
    ///
    /// No network I/O is performed.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if the URL does not parse.
    pub fn new(
        base_url: &str,
        http: reqwest::Client,
        protocol_version: &'static str,
        client_info: Implementation,
    ) -> std::result::Result<Self, ToolboxError> {
        let base_url = normalize_mcp_url(base_url);
        url::Url::parse(&base_url)
            .map_err(|e| ToolboxError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            base_url,
            http,
            protocol_version,
            client_info,
            gate: HandshakeGate::new(),
        })
    }

    /// The canonical MCP endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The protocol version this connection claims.
    pub fn protocol_version(&self) -> &'static str {
        self.protocol_version
    }

    /// The committed session, once the handshake has succeeded.
    pub fn session(&self) -> Option<&Session> {
        self.gate.value()
    }

    /// Server implementation version recorded at handshake.
    pub fn server_version(&self) -> Option<&str> {
        self.session().map(|session| session.server_version.as_str())
    }

    /// Session id issued by the server, for session-bearing revisions.
    pub fn session_id(&self) -> Option<&str> {
        self.session().and_then(|session| session.session_id.as_deref())
    }

    /// Current handshake state.
    pub fn handshake_state(&self) -> HandshakeState {
        self.gate.state()
    }

    /// URL for listing `toolset_name`; the canonical URL for the default
    /// toolset.
    fn toolset_url(&self, toolset_name: &str) -> std::result::Result<String, ToolboxError> {
        if toolset_name.is_empty() {
            return Ok(self.base_url.clone());
        }
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| ToolboxError::Config(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ToolboxError::Config(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(toolset_name);
        Ok(url.to_string())
    }

    async fn post<R: ProtocolRevision + ?Sized>(
        &self,
        revision: &R,
        session: Option<&Session>,
        ctx: &CallContext,
        url: &str,
        body: Vec<u8>,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<reqwest::Response, ToolboxError> {
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let request = revision.frame(self, session, request);
        let request = http::apply_headers(request, headers)?;
        http::send(ctx, request, url).await
    }

    /// Send a JSON-RPC request to `url` and unwrap its result.
    ///
    /// `session` is framed onto the request; pass `None` before one exists.
    ///
    /// # Errors
    ///
    /// - [`ToolboxError::HttpStatus`] for any status other than 200/202/204.
    /// - [`ToolboxError::Protocol`] for a 202/204 where a result is expected.
    /// - [`ToolboxError::Unmarshal`] for a body that is not JSON-RPC.
    /// - [`ToolboxError::Rpc`] for an error envelope.
    /// - network and cancellation errors from [`http::send`].
    #[allow(clippy::too_many_arguments)]
    pub async fn call<R: ProtocolRevision + ?Sized>(
        &self,
        revision: &R,
        session: Option<&Session>,
        ctx: &CallContext,
        url: &str,
        method: &str,
        params: Value,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<RpcReply, ToolboxError> {
        let request = JsonRpcRequest::new(method, Some(params));
        tracing::debug!(method, url, id = %request.id, "Sending MCP request");

        let response = self
            .post(revision, session, ctx, url, jsonrpc::encode(&request)?, headers)
            .await?;
        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = http::read_body(ctx, response, url).await?;

        match status {
            200 => {}
            202 | 204 => {
                return Err(ToolboxError::Protocol(format!(
                    "'{}' expects a result but the server returned status {} with no body",
                    method, status
                )))
            }
            _ => return Err(ToolboxError::HttpStatus { status, body }),
        }

        let result = jsonrpc::decode_response(&body)?.into_result(&request.id)?;
        Ok(RpcReply {
            result,
            headers: response_headers,
        })
    }

    /// Send a JSON-RPC notification to the canonical URL.
    ///
    /// 200, 202 and 204 all acknowledge the notification; any body is
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`ToolboxError::HttpStatus`] for any other status, plus network and
    /// cancellation errors.
    pub async fn notify<R: ProtocolRevision + ?Sized>(
        &self,
        revision: &R,
        session: Option<&Session>,
        ctx: &CallContext,
        method: &str,
        params: Value,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<(), ToolboxError> {
        let notification = JsonRpcNotification::new(method, Some(params));
        tracing::debug!(method, url = %self.base_url, "Sending MCP notification");

        let response = self
            .post(
                revision,
                session,
                ctx,
                &self.base_url,
                jsonrpc::encode(&notification)?,
                headers,
            )
            .await?;
        let status = response.status().as_u16();
        match status {
            200 | 202 | 204 => Ok(()),
            _ => {
                let body = http::read_body(ctx, response, &self.base_url).await?;
                Err(ToolboxError::HttpStatus { status, body })
            }
        }
    }

    /// Handshake steps 1-4: send `initialize`, check the echoed version and
    /// the `tools` capability, and read the server version.
    ///
    /// Returns the pending [`Session`] (no session id yet) together with the
    /// response headers, where session-bearing revisions find their id.
    ///
    /// # Errors
    ///
    /// [`ToolboxError::VersionMismatch`] or
    /// [`ToolboxError::MissingCapability`], plus everything [`Self::call`]
    /// returns.
    pub async fn initialize<R: ProtocolRevision + ?Sized>(
        &self,
        revision: &R,
        ctx: &CallContext,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<(Session, HeaderMap), ToolboxError> {
        let params = serde_json::to_value(InitializeParams {
            protocol_version: self.protocol_version.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: self.client_info.clone(),
        })
        .map_err(|e| ToolboxError::Marshal(e.to_string()))?;

        let reply = self
            .call(revision, None, ctx, &self.base_url, METHOD_INITIALIZE, params, headers)
            .await?;
        let result: InitializeResult = jsonrpc::decode_result(METHOD_INITIALIZE, reply.result)?;

        if result.protocol_version != self.protocol_version {
            return Err(ToolboxError::VersionMismatch {
                expected: self.protocol_version.to_string(),
                actual: result.protocol_version,
            });
        }

        if result.capabilities.tools.is_none() {
            return Err(ToolboxError::MissingCapability("tools".to_string()));
        }

        let session = Session {
            server_version: result.server_info.version,
            session_id: None,
        };
        Ok((session, reply.headers))
    }

    /// Handshake step 6: send `notifications/initialized`, framed with the
    /// session being established.
    ///
    /// # Errors
    ///
    /// Same as [`Self::notify`].
    pub async fn send_initialized<R: ProtocolRevision + ?Sized>(
        &self,
        revision: &R,
        session: &Session,
        ctx: &CallContext,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<(), ToolboxError> {
        self.notify(revision, Some(session), ctx, METHOD_INITIALIZED, json!({}), headers)
            .await
    }
}

// ---------------------------------------------------------------------------
// McpTransport
// ---------------------------------------------------------------------------

/// [`Transport`] over one MCP revision.
///
/// # Examples
///
/// ```
/// use toolbox_transport::transport::mcp::{McpTransport, V20250618};
/// use toolbox_transport::transport::Transport;
///
/// let transport = McpTransport::<V20250618>::new(
///     "http://localhost:5000",
///     reqwest::Client::new(),
/// ).unwrap();
/// assert_eq!(transport.base_url(), "http://localhost:5000/mcp/");
/// ```
#[derive(Debug)]
pub struct McpTransport<R: ProtocolRevision> {
    conn: Connection,
    revision: R,
    insecure: InsecureHttpWarning,
}

impl<R: ProtocolRevision + Default> McpTransport<R> {
    /// Create a transport with the default client identity.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if `base_url` does not parse.
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self> {
        Self::with_client_info(base_url, http, default_client_info())
    }

    /// Create a transport that identifies itself as `client_info`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if `base_url` does not parse.
    pub fn with_client_info(
        base_url: &str,
        http: reqwest::Client,
        client_info: Implementation,
    ) -> Result<Self> {
        let revision = R::default();
        let conn = Connection::new(base_url, http, revision.protocol_version(), client_info)?;
        Ok(Self {
            conn,
            revision,
            insecure: InsecureHttpWarning::default(),
        })
    }
}

impl<R: ProtocolRevision> McpTransport<R> {
    /// The shared connection state.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Complete the handshake if no outcome is committed yet.
    ///
    /// Exactly one handshake runs per connection regardless of how many
    /// callers arrive concurrently; a failure is replayed to every later
    /// caller. `headers` are passed through to the handshake requests.
    ///
    /// # Errors
    ///
    /// The committed handshake error, or the caller's cancellation error.
    pub async fn ensure_ready(
        &self,
        ctx: &CallContext,
        headers: &HashMap<String, String>,
    ) -> Result<&Session> {
        self.conn
            .gate
            .ensure_ready(|| async {
                let outcome = self.revision.handshake(&self.conn, ctx, headers).await;
                match &outcome {
                    Ok(session) => tracing::info!(
                        url = %self.conn.base_url,
                        protocol_version = self.conn.protocol_version,
                        server_version = %session.server_version,
                        has_session = session.session_id.is_some(),
                        "MCP handshake complete"
                    ),
                    Err(err) if !err.is_cancellation() => tracing::warn!(
                        url = %self.conn.base_url,
                        protocol_version = self.conn.protocol_version,
                        error = %err,
                        "MCP handshake failed"
                    ),
                    Err(_) => {}
                }
                outcome
            })
            .await
            .with_context(|| format!("MCP handshake with {} failed", self.conn.base_url))
    }
}

#[async_trait]
impl<R: ProtocolRevision> Transport for McpTransport<R> {
    fn base_url(&self) -> &str {
        self.conn.base_url()
    }

    fn protocol(&self) -> Protocol {
        self.revision.protocol()
    }

    async fn get_tool(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ManifestSchema> {
        let mut manifest = self.list_tools(ctx, "", headers).await?;
        let tool = manifest
            .tools
            .remove(tool_name)
            .ok_or_else(|| ToolboxError::ToolNotFound(tool_name.to_string()))?;

        Ok(ManifestSchema {
            server_version: manifest.server_version,
            tools: HashMap::from([(tool_name.to_string(), tool)]),
        })
    }

    async fn list_tools(
        &self,
        ctx: &CallContext,
        toolset_name: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ManifestSchema> {
        self.insecure.check(&self.conn.base_url, headers);
        let session = self.ensure_ready(ctx, headers).await?;

        let url = self.conn.toolset_url(toolset_name)?;
        let reply = self
            .conn
            .call(
                &self.revision,
                Some(session),
                ctx,
                &url,
                METHOD_TOOLS_LIST,
                json!({}),
                headers,
            )
            .await
            .with_context(|| format!("Failed to list tools for toolset '{}'", toolset_name))?;

        let listed: ListToolsResult = jsonrpc::decode_result(METHOD_TOOLS_LIST, reply.result)?;
        let tools = schema::convert_tool_list(&listed.tools)
            .with_context(|| format!("Malformed tools/list result from {}", url))?;

        Ok(ManifestSchema {
            server_version: session.server_version.clone(),
            tools,
        })
    }

    async fn invoke_tool(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        payload: &Value,
        headers: &HashMap<String, String>,
    ) -> Result<Value> {
        self.insecure.check(&self.conn.base_url, headers);
        let session = self.ensure_ready(ctx, headers).await?;

        let arguments = if payload.is_null() {
            json!({})
        } else {
            payload.clone()
        };
        let params = serde_json::to_value(CallToolParams {
            name: tool_name.to_string(),
            arguments,
        })
        .map_err(|e| ToolboxError::Marshal(e.to_string()))?;

        let reply = self
            .conn
            .call(
                &self.revision,
                Some(session),
                ctx,
                &self.conn.base_url,
                METHOD_TOOLS_CALL,
                params,
                headers,
            )
            .await
            .with_context(|| format!("Failed to invoke tool '{}'", tool_name))?;

        let result: CallToolResult = jsonrpc::decode_result(METHOD_TOOLS_CALL, reply.result)?;
        let output = content::normalize(&result.content);

        if result.is_error {
            let detail = match output {
                Value::String(text) => text,
                _ => "no details provided".to_string(),
            };
            return Err(ToolboxError::ToolExecution {
                tool: tool_name.to_string(),
                detail,
            }
            .into());
        }

        Ok(output)
    }
}
