//! MCP revision `2024-11-05`
//!
//! The baseline revision: no session, no per-request protocol header, no
//! explicit `Accept`. Requests carry only `Content-Type` and whatever the
//! caller supplies.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Connection, McpTransport, ProtocolRevision, Session};
use crate::context::CallContext;
use crate::error::ToolboxError;
use crate::protocol::Protocol;

/// Strategy for the `2024-11-05` revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct V20241105;

/// Transport speaking MCP `2024-11-05`.
pub type McpTransportV20241105 = McpTransport<V20241105>;

#[async_trait]
impl ProtocolRevision for V20241105 {
    fn protocol(&self) -> Protocol {
        Protocol::Mcp20241105
    }

    fn frame(
        &self,
        _conn: &Connection,
        _session: Option<&Session>,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        request
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

    #[test]
    fn test_version_string() {
        assert_eq!(V20241105.protocol_version(), "2024-11-05");
        assert_eq!(V20241105.protocol(), Protocol::Mcp20241105);
    }

    #[test]
    fn test_frame_adds_nothing() {
        let client = reqwest::Client::new();
        let conn = Connection::new(
            "http://localhost:5000",
            client.clone(),
            V20241105.protocol_version(),
            default_client_info(),
        )
        .unwrap();

        let request = V20241105
            .frame(&conn, None, client.post(conn.base_url()))
            .build()
            .unwrap();
        assert!(request.headers().is_empty());
    }
}
