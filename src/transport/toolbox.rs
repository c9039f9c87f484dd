//! REST transport for the Toolbox native API
//!
//! Endpoints, relative to the base URL:
//!
//! | Operation | Request |
//! |---|---|
//! | list toolset | `GET /api/toolset/{name}` |
//! | get tool | `GET /api/tool/{name}` |
//! | invoke | `POST /api/tool/{name}/invoke` |
//!
//! Names are percent-encoded as single path segments. Manifest responses
//! already have the normalized shape and deserialize straight into
//! [`ManifestSchema`]. There is no handshake.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;

use crate::context::CallContext;
use crate::error::{Result, ToolboxError};
use crate::protocol::Protocol;
use crate::transport::http::{self, InsecureHttpWarning};
use crate::transport::Transport;
use crate::types::ManifestSchema;

/// Body of an invoke response: either `result` or `error`.
#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// [`Transport`] over the REST endpoints.
///
/// # Examples
///
/// ```
/// use toolbox_transport::transport::toolbox::ToolboxTransport;
/// use toolbox_transport::transport::Transport;
///
/// let transport = ToolboxTransport::new("http://localhost:5000/", reqwest::Client::new()).unwrap();
/// assert_eq!(transport.base_url(), "http://localhost:5000");
/// ```
#[derive(Debug)]
pub struct ToolboxTransport {
    base_url: String,
    http: reqwest::Client,
    insecure: InsecureHttpWarning,
}

impl ToolboxTransport {
    /// Create a REST transport rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if `base_url` does not parse.
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ToolboxError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            base_url,
            http,
            insecure: InsecureHttpWarning::default(),
        })
    }

    /// `{base}/{segments...}`, each segment percent-encoded.
    fn endpoint_url(&self, segments: &[&str]) -> std::result::Result<String, ToolboxError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| ToolboxError::Config(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ToolboxError::Config(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    async fn fetch_manifest(
        &self,
        ctx: &CallContext,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<ManifestSchema, ToolboxError> {
        self.insecure.check(&self.base_url, headers);
        tracing::debug!(url, "Fetching tool manifest");

        let request = http::apply_headers(self.http.get(url), headers)?;
        let response = http::send(ctx, request, url).await?;
        let status = response.status().as_u16();
        let body = http::read_body(ctx, response, url).await?;

        if status != 200 {
            return Err(ToolboxError::HttpStatus { status, body });
        }

        serde_json::from_str(&body)
            .map_err(|e| ToolboxError::Unmarshal(format!("invalid manifest from {}: {}", url, e)))
    }

    async fn post_invoke(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        payload: &Value,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<Value, ToolboxError> {
        let url = self.endpoint_url(&["api", "tool", tool_name, "invoke"])?;
        tracing::debug!(url = %url, tool = tool_name, "Invoking tool");

        let body = serde_json::to_vec(payload).map_err(|e| ToolboxError::Marshal(e.to_string()))?;
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let request = http::apply_headers(request, headers)?;

        let response = http::send(ctx, request, &url).await?;
        let status = response.status().as_u16();
        let body = http::read_body(ctx, response, &url).await?;

        if status != 200 {
            return Err(ToolboxError::HttpStatus { status, body });
        }

        let parsed: InvokeResponse = serde_json::from_str(&body)
            .map_err(|e| ToolboxError::Unmarshal(format!("invalid invoke response: {}", e)))?;

        if let Some(error) = parsed.error.filter(|e| !e.is_null()) {
            let detail = match error {
                Value::String(text) => text,
                other => other.to_string(),
            };
            return Err(ToolboxError::ToolExecution {
                tool: tool_name.to_string(),
                detail,
            });
        }

        Ok(parsed.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Transport for ToolboxTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn protocol(&self) -> Protocol {
        Protocol::Toolbox
    }

    async fn get_tool(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ManifestSchema> {
        let url = self.endpoint_url(&["api", "tool", tool_name])?;
        self.fetch_manifest(ctx, &url, headers)
            .await
            .with_context(|| format!("Failed to get tool '{}'", tool_name))
    }

    async fn list_tools(
        &self,
        ctx: &CallContext,
        toolset_name: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ManifestSchema> {
        let url = self.endpoint_url(&["api", "toolset", toolset_name])?;
        self.fetch_manifest(ctx, &url, headers)
            .await
            .with_context(|| format!("Failed to list tools for toolset '{}'", toolset_name))
    }

    async fn invoke_tool(
        &self,
        ctx: &CallContext,
        tool_name: &str,
        payload: &Value,
        headers: &HashMap<String, String>,
    ) -> Result<Value> {
        self.insecure.check(&self.base_url, headers);
        self.post_invoke(ctx, tool_name, payload, headers)
            .await
            .with_context(|| format!("Failed to invoke tool '{}'", tool_name))
    }
}
