//! Shared HTTP plumbing for every transport
//!
//! Both the MCP revisions and the REST transport go through these helpers:
//!
//! - [`apply_headers`] merges the caller's resolved header map into a
//!   request, after any transport-owned headers so the caller wins.
//! - [`send`] issues the request under a [`CallContext`], mapping network
//!   failures to [`ToolboxError::Transport`].
//! - [`read_body`] reads the full response body under the same context.
//!
//! These are the only suspension points in the crate: nothing else awaits
//! on I/O.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::context::CallContext;
use crate::error::ToolboxError;

/// Default per-request timeout for clients built by this crate.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build a `reqwest` client with the given per-request timeout.
///
/// # Errors
///
/// Returns [`ToolboxError::Config`] if the TLS backend fails to initialise.
pub fn build_client(timeout: std::time::Duration) -> std::result::Result<reqwest::Client, ToolboxError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ToolboxError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Merge `headers` into `request`, replacing any header of the same name
/// already set on it.
///
/// # Errors
///
/// Returns [`ToolboxError::Config`] if a name or value is not a valid HTTP
/// header.
pub fn apply_headers(
    request: reqwest::RequestBuilder,
    headers: &HashMap<String, String>,
) -> std::result::Result<reqwest::RequestBuilder, ToolboxError> {
    if headers.is_empty() {
        return Ok(request);
    }

    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ToolboxError::Config(format!("Invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ToolboxError::Config(format!("Invalid value for header '{}': {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(request.headers(map))
}

/// Send `request` unless `ctx` is cancelled or expires first.
///
/// # Errors
///
/// Returns [`ToolboxError::Cancelled`] / [`ToolboxError::DeadlineExceeded`]
/// when the context fires, or [`ToolboxError::Transport`] when the request
/// itself fails.
pub async fn send(
    ctx: &CallContext,
    request: reqwest::RequestBuilder,
    target: &str,
) -> std::result::Result<reqwest::Response, ToolboxError> {
    ctx.run(request.send())
        .await?
        .map_err(|e| ToolboxError::from_reqwest(target, e))
}

/// Read the complete body of `response` as text under `ctx`.
///
/// # Errors
///
/// Same as [`send`].
pub async fn read_body(
    ctx: &CallContext,
    response: reqwest::Response,
    target: &str,
) -> std::result::Result<String, ToolboxError> {
    ctx.run(response.text())
        .await?
        .map_err(|e| ToolboxError::Transport(format!("Failed to read response from {}: {}", target, e)))
}

/// Logs a single warning the first time credentials go over plain HTTP.
#[derive(Debug, Default)]
pub struct InsecureHttpWarning {
    warned: AtomicBool,
}

impl InsecureHttpWarning {
    /// Warn once when `url` is plain `http://` and `headers` is non-empty.
    pub fn check(&self, url: &str, headers: &HashMap<String, String>) {
        if headers.is_empty() || !url.starts_with("http://") {
            return;
        }
        if !self.warned.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                url = %url,
                "This connection is using HTTP. To prevent credential exposure, \
                 please ensure all communication is sent over HTTPS."
            );
        }
    }

    /// Whether the warning has been emitted.
    pub fn fired(&self) -> bool {
        self.warned.load(Ordering::Relaxed)
    }
}
