//! MCP revision `2025-11-25`
//!
//! Same framing as `2025-06-18` under a newer version string. This is the
//! revision [`Protocol::Mcp`] resolves to.

use std::collections::HashMap;

use async_trait::async_trait;

use super::v20250618::frame_with_version_header;
use super::{Connection, McpTransport, ProtocolRevision, Session};
use crate::context::CallContext;
use crate::error::ToolboxError;
use crate::protocol::Protocol;

/// Strategy for the `2025-11-25` revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct V20251125;

/// Transport speaking MCP `2025-11-25`.
pub type McpTransportV20251125 = McpTransport<V20251125>;

#[async_trait]
impl ProtocolRevision for V20251125 {
    fn protocol(&self) -> Protocol {
        Protocol::Mcp20251125
    }

    fn frame(
        &self,
        conn: &Connection,
        _session: Option<&Session>,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        frame_with_version_header(conn, request)
    }

    async fn handshake(
        &self,
        conn: &Connection,
        ctx: &CallContext,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<Session, ToolboxError> {
        let (session, _) = conn.initialize(self, ctx, headers).await?;
        conn.send_initialized(self, &session, ctx, headers).await?;
        Ok(session)
    }
}
