//! MCP revision `2025-06-18`
//!
//! No session. Every POST, `initialize` included, re-asserts the negotiated
//! version in the `MCP-Protocol-Version` header and asks for a plain JSON
//! response.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use super::types::HEADER_PROTOCOL_VERSION;
use super::{Connection, McpTransport, ProtocolRevision, Session};
use crate::context::CallContext;
use crate::error::ToolboxError;
use crate::protocol::Protocol;

/// Strategy for the `2025-06-18` revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct V20250618;

/// Transport speaking MCP `2025-06-18`.
pub type McpTransportV20250618 = McpTransport<V20250618>;

/// Framing shared by the revisions that send the protocol version header.
pub(crate) fn frame_with_version_header(
    conn: &Connection,
    request: reqwest::RequestBuilder,
) -> reqwest::RequestBuilder {
    request
        .header(ACCEPT, "application/json")
        .header(HEADER_PROTOCOL_VERSION, conn.protocol_version())
}

#[async_trait]
impl ProtocolRevision for V20250618 {
    fn protocol(&self) -> Protocol {
        Protocol::Mcp20250618
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mcp::default_client_info;
    use crate::transport::mcp::types::HEADER_SESSION_ID;

    #[test]
    fn test_frame_sends_version_header() {
        let client = reqwest::Client::new();
        let conn = Connection::new(
            "http://localhost:5000",
            client.clone(),
            V20250618.protocol_version(),
            default_client_info(),
        )
        .unwrap();

        let session = Session {
            server_version: "1.0.0".to_string(),
            session_id: Some("ignored".to_string()),
        };
        let request = V20250618
            .frame(&conn, Some(&session), client.post(conn.base_url()))
            .build()
            .unwrap();
        assert_eq!(request.headers()[HEADER_PROTOCOL_VERSION], "2025-06-18");
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert!(request.headers().get(HEADER_SESSION_ID).is_none());
    }
}
