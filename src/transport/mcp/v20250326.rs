//! MCP revision `2025-03-26`
//!
//! Adds a header-based session. The server issues `Mcp-Session-Id` on the
//! `initialize` response; every later POST on the connection, the
//! `notifications/initialized` notification included, echoes it back. A
//! server that omits the header fails the handshake with
//! [`ToolboxError::MissingSessionId`].
//!
//! The id travels in the [`Session`] the handshake returns. It is framed
//! onto the notification directly and onto `tools/*` requests only after
//! the gate has committed it.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use super::types::HEADER_SESSION_ID;
use super::{Connection, McpTransport, ProtocolRevision, Session};
use crate::context::CallContext;
use crate::error::ToolboxError;
use crate::protocol::Protocol;

/// Strategy for the `2025-03-26` revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct V20250326;

/// Transport speaking MCP `2025-03-26`.
pub type McpTransportV20250326 = McpTransport<V20250326>;

#[async_trait]
impl ProtocolRevision for V20250326 {
    fn protocol(&self) -> Protocol {
        Protocol::Mcp20250326
    }

    fn frame(
        &self,
        _conn: &Connection,
        session: Option<&Session>,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match session.and_then(|session| session.session_id.as_deref()) {
            Some(id) => request.header(HEADER_SESSION_ID, id),
            None => request,
        }
    }

    async fn handshake(
        &self,
        conn: &Connection,
        ctx: &CallContext,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<Session, ToolboxError> {
        let (mut session, reply_headers) = conn.initialize(self, ctx, headers).await?;

        let session_id = reply_headers
            .get(HEADER_SESSION_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ToolboxError::MissingSessionId)?;
        session.session_id = Some(session_id.to_string());
        tracing::debug!(url = %conn.base_url(), "MCP session issued");

        conn.send_initialized(self, &session, ctx, headers).await?;
        Ok(session)
    }
}
