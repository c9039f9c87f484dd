//! Toolbox Transport - client-side transport layer for remote tool servers
//!
//! This library discovers and invokes tools hosted on a tool server over
//! one of several wire protocols: four revisions of the Model Context
//! Protocol (JSON-RPC 2.0 over HTTP POST) and a plain REST API. Whatever
//! the protocol, callers see the same normalized data model.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `transport`: the [`Transport`] trait, the factory, and every
//!   implementation
//! - `transport::mcp`: shared MCP machinery (connection state, handshake
//!   gate, JSON-RPC codec, schema translation, result normalization) and
//!   the per-revision strategies
//! - `transport::toolbox`: the REST transport
//! - `types`: the normalized manifest, tool and parameter schemas
//! - `protocol`: protocol selection
//! - `context`: caller-supplied cancellation and deadlines
//! - `config`: YAML and environment configuration
//! - `logging`: tracing subscriber setup
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use toolbox_transport::{build_transport, CallContext, Protocol, Transport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = build_transport(
//!         Protocol::Mcp,
//!         "http://localhost:5000",
//!         reqwest::Client::new(),
//!     )?;
//!
//!     let ctx = CallContext::background();
//!     let headers = HashMap::new();
//!     let manifest = transport.list_tools(&ctx, "", &headers).await?;
//!     for name in manifest.tools.keys() {
//!         println!("{}", name);
//!     }
//!
//!     let output = transport
//!         .invoke_tool(&ctx, "search_hotels", &serde_json::json!({"city": "Paris"}), &headers)
//!         .await?;
//!     println!("{}", output);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::{LoggingConfig, TransportConfig};
pub use context::CallContext;
pub use error::{Result, ToolboxError};
pub use protocol::Protocol;
pub use transport::{build_transport, Transport};
pub use types::{AdditionalProperties, ManifestSchema, ParameterSchema, ToolSchema};
