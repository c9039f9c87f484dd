//! Error types for the toolbox transport layer
//!
//! This module defines [`ToolboxError`], the root cause carried by every
//! error this crate returns. Public functions return [`Result`], an
//! `anyhow::Result`, so callers can attach their own context while still
//! branching on the failure kind with
//! `err.downcast_ref::<ToolboxError>()`.
//!
//! Variants carry owned strings instead of foreign error types so that the
//! error is `Clone` and `PartialEq`. The handshake gate depends on this: a
//! failed handshake is stored once and replayed verbatim to every later
//! caller of the same connection.

use thiserror::Error;

/// Main error type for toolbox transport operations
///
/// Grouped by failure category:
///
/// - network: [`ToolboxError::Transport`]
/// - encoding: [`ToolboxError::Marshal`], [`ToolboxError::Unmarshal`]
/// - HTTP status: [`ToolboxError::HttpStatus`]
/// - JSON-RPC: [`ToolboxError::Rpc`], [`ToolboxError::ResponseIdMismatch`],
///   [`ToolboxError::Protocol`]
/// - negotiation: [`ToolboxError::VersionMismatch`],
///   [`ToolboxError::MissingCapability`]
/// - session: [`ToolboxError::MissingSessionId`]
/// - definitions: [`ToolboxError::MalformedDefinition`]
/// - tools: [`ToolboxError::ToolExecution`], [`ToolboxError::ToolNotFound`]
/// - cancellation: [`ToolboxError::Cancelled`],
///   [`ToolboxError::DeadlineExceeded`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolboxError {
    /// Network-level failure (connection refused, reset, client timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A request payload could not be encoded
    #[error("Failed to marshal request: {0}")]
    Marshal(String),

    /// A response body was not valid JSON or did not match the expected shape
    #[error("Failed to unmarshal response: {0}")]
    Unmarshal(String),

    /// The server answered with a non-success HTTP status
    #[error("API request failed with status {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// A well-formed JSON-RPC envelope carrying an error object
    #[error("MCP request failed with code {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Server-supplied message, verbatim
        message: String,
    },

    /// The response `id` does not match the request `id`
    #[error("Response ID mismatch: expected {expected}, got {actual}")]
    ResponseIdMismatch {
        /// The correlation id that was sent
        expected: String,
        /// The correlation id the server echoed
        actual: String,
    },

    /// Unexpected message shape or status for the exchange in progress
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server selected a different protocol version than the client claimed
    #[error("MCP version mismatch: client requested {expected}, server selected {actual}")]
    VersionMismatch {
        /// Version claimed by the client
        expected: String,
        /// Version echoed by the server
        actual: String,
    },

    /// The server did not advertise a required capability
    #[error("Server does not support the '{0}' capability")]
    MissingCapability(String),

    /// A session-bearing protocol revision got no session id at handshake
    #[error("Server did not return a Mcp-Session-Id during initialization")]
    MissingSessionId,

    /// A tool definition in a listing violates the protocol
    #[error("Invalid tool definition at index {index}: {reason}")]
    MalformedDefinition {
        /// Position of the offending definition in the listing
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// The remote tool ran but reported an error result
    #[error("Tool '{tool}' execution resulted in error: {detail}")]
    ToolExecution {
        /// Name of the invoked tool
        tool: String,
        /// Text the server returned alongside the error flag
        detail: String,
    },

    /// The requested tool is not part of the manifest
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    /// The caller's cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's deadline expired
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ToolboxError {
    /// Returns `true` for failures caused by the caller's context rather than
    /// by the remote side.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolbox_transport::error::ToolboxError;
    ///
    /// assert!(ToolboxError::Cancelled.is_cancellation());
    /// assert!(ToolboxError::DeadlineExceeded.is_cancellation());
    /// assert!(!ToolboxError::MissingSessionId.is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ToolboxError::Cancelled | ToolboxError::DeadlineExceeded)
    }

    /// Returns `true` for negotiation and session failures, which are fatal
    /// for the connection that produced them.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self,
            ToolboxError::VersionMismatch { .. }
                | ToolboxError::MissingCapability(_)
                | ToolboxError::MissingSessionId
        )
    }

    /// Map a `reqwest` failure onto the transport category.
    pub(crate) fn from_reqwest(target: &str, err: reqwest::Error) -> Self {
        ToolboxError::Transport(format!("HTTP request to {} failed: {}", target, err))
    }
}

/// Result type alias for toolbox transport operations
///
/// Uses `anyhow::Error` so call sites can layer context over the
/// [`ToolboxError`] root cause.
pub type Result<T> = anyhow::Result<T>;

/// Extract the [`ToolboxError`] root cause from an `anyhow::Error`.
///
/// Errors that did not originate in this crate are folded into
/// [`ToolboxError::Protocol`] with their full context chain.
///
/// # Examples
///
/// ```
/// use anyhow::Context;
/// use toolbox_transport::error::{root_cause, ToolboxError};
///
/// let err = Err::<(), _>(ToolboxError::MissingSessionId)
///     .context("MCP handshake failed")
///     .unwrap_err();
/// assert_eq!(root_cause(&err), ToolboxError::MissingSessionId);
/// ```
pub fn root_cause(err: &anyhow::Error) -> ToolboxError {
    err.downcast_ref::<ToolboxError>()
        .cloned()
        .unwrap_or_else(|| ToolboxError::Protocol(format!("{:#}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_http_status_display() {
        let error = ToolboxError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "API request failed with status 500: boom"
        );
    }

    #[test]
    fn test_rpc_error_display_keeps_message_verbatim() {
        let error = ToolboxError::Rpc {
            code: -32601,
            message: "Method not found: tools/frobnicate".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "MCP request failed with code -32601: Method not found: tools/frobnicate"
        );
    }

    #[test]
    fn test_malformed_definition_names_index() {
        let error = ToolboxError::MalformedDefinition {
            index: 2,
            reason: "missing 'name' field".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid tool definition at index 2: missing 'name' field"
        );
    }

    #[test]
    fn test_version_mismatch_is_handshake_failure() {
        let error = ToolboxError::VersionMismatch {
            expected: "2025-06-18".to_string(),
            actual: "2024-11-05".to_string(),
        };
        assert!(error.is_handshake_failure());
        assert!(!error.is_cancellation());
        assert!(ToolboxError::MissingSessionId.is_handshake_failure());
        assert!(ToolboxError::MissingCapability("tools".into()).is_handshake_failure());
    }

    #[test]
    fn test_root_cause_survives_context() {
        let err: anyhow::Error = Err::<(), _>(ToolboxError::MissingSessionId)
            .context("handshake with http://localhost/mcp/")
            .unwrap_err();
        assert_eq!(root_cause(&err), ToolboxError::MissingSessionId);
    }

    #[test]
    fn test_root_cause_of_foreign_error_is_protocol() {
        let err = anyhow::anyhow!("something else");
        assert!(matches!(root_cause(&err), ToolboxError::Protocol(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToolboxError>();
    }
}
