//! Configuration for building a transport
//!
//! Loaded from a YAML file, then overridden by environment variables, then
//! validated:
//!
//! ```yaml
//! base_url: https://toolbox.example.com
//! protocol: "2025-06-18"
//! timeout_seconds: 30
//! client_name: my-agent
//! logging:
//!   level: debug
//!   json_format: true
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `TOOLBOX_URL` | `base_url` |
//! | `TOOLBOX_PROTOCOL` | `protocol` |
//! | `TOOLBOX_TIMEOUT_SECONDS` | `timeout_seconds` |
//! | `TOOLBOX_CLIENT_NAME` | `client_name` |

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolboxError};
use crate::protocol::Protocol;
use crate::transport::http::{self, DEFAULT_TIMEOUT_SECS};
use crate::transport::mcp::types::Implementation;
use crate::transport::mcp::{self, CLIENT_NAME};
use crate::transport::{self, Transport};

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Server base URL
    pub base_url: String,

    /// Wire protocol
    #[serde(default)]
    pub protocol: Protocol,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Client name sent in the MCP `initialize` request
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_client_name() -> String {
    CLIENT_NAME.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl TransportConfig {
    /// Create a configuration for `base_url` with every other field at its
    /// default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            protocol: Protocol::default(),
            timeout_seconds: default_timeout_seconds(),
            client_name: default_client_name(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a YAML file, apply environment overrides and
    /// validate the result.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if the file is missing or does not
    /// parse, or if validation fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use toolbox_transport::config::TransportConfig;
    ///
    /// let config = TransportConfig::load("toolbox.yaml")?;
    /// let transport = config.build_transport()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;
        config.apply_env_vars();
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            protocol = %config.protocol,
            url = %config.base_url,
            "Loaded transport configuration"
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ToolboxError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string. No overrides, no validation.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if the YAML does not parse.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| ToolboxError::Config(format!("Failed to parse config: {}", e)).into())
    }

    /// Apply `TOOLBOX_*` environment overrides. Invalid values are logged
    /// and ignored.
    pub fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("TOOLBOX_URL") {
            self.base_url = url;
        }

        if let Ok(protocol) = std::env::var("TOOLBOX_PROTOCOL") {
            match protocol.parse() {
                Ok(value) => self.protocol = value,
                Err(_) => tracing::warn!("Invalid TOOLBOX_PROTOCOL: {}", protocol),
            }
        }

        if let Ok(timeout) = std::env::var("TOOLBOX_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid TOOLBOX_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(client_name) = std::env::var("TOOLBOX_CLIENT_NAME") {
            self.client_name = client_name;
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if the URL is empty, unparseable or
    /// not `http`/`https`, if the timeout is zero, or if the client name is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ToolboxError::Config("base_url cannot be empty".to_string()).into());
        }

        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ToolboxError::Config(format!("Invalid base_url '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ToolboxError::Config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            ))
            .into());
        }

        if self.timeout_seconds == 0 {
            return Err(
                ToolboxError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.client_name.trim().is_empty() {
            return Err(ToolboxError::Config("client_name cannot be empty".to_string()).into());
        }

        Ok(())
    }

    /// The per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build the configured transport with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Config`] if the HTTP client cannot be built or
    /// the URL is rejected.
    pub fn build_transport(&self) -> Result<Arc<dyn Transport>> {
        let client = http::build_client(self.timeout())?;
        let client_info = Implementation {
            name: self.client_name.clone(),
            version: mcp::default_client_info().version,
        };
        transport::build_transport_with_client_info(self.protocol, &self.base_url, client, client_info)
    }
}
