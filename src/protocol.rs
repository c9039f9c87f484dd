//! Protocol selection
//!
//! [`Protocol`] names every wire protocol this crate speaks: four MCP
//! revisions, an alias for the newest one, and the REST alternative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ToolboxError;

/// MCP revision `2024-11-05`: no session, no extra headers.
pub const PROTOCOL_VERSION_2024_11_05: &str = "2024-11-05";
/// MCP revision `2025-03-26`: header-based session id.
pub const PROTOCOL_VERSION_2025_03_26: &str = "2025-03-26";
/// MCP revision `2025-06-18`: protocol version re-asserted per request.
pub const PROTOCOL_VERSION_2025_06_18: &str = "2025-06-18";
/// MCP revision `2025-11-25`: the current default.
pub const PROTOCOL_VERSION_2025_11_25: &str = "2025-11-25";

/// The most recent supported MCP revision; the target of [`Protocol::Mcp`].
pub const LATEST_PROTOCOL_VERSION: &str = PROTOCOL_VERSION_2025_11_25;

/// Wire protocol used to reach a tool server.
///
/// Parses from and displays as the revision date, `"mcp"` for the alias, or
/// `"toolbox"` for REST.
///
/// # Examples
///
/// ```
/// use toolbox_transport::protocol::Protocol;
///
/// let p: Protocol = "2025-03-26".parse().unwrap();
/// assert_eq!(p, Protocol::Mcp20250326);
/// assert_eq!(Protocol::Mcp.resolve(), Protocol::Mcp20251125);
/// assert_eq!(Protocol::Toolbox.protocol_version(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Protocol {
    /// MCP `2024-11-05`
    Mcp20241105,
    /// MCP `2025-03-26`
    Mcp20250326,
    /// MCP `2025-06-18`
    Mcp20250618,
    /// MCP `2025-11-25`
    Mcp20251125,
    /// Alias for the newest MCP revision
    #[default]
    Mcp,
    /// REST endpoints under `/api/`
    Toolbox,
}

impl Protocol {
    /// Every MCP revision, oldest first. The alias and REST are excluded.
    pub const MCP_REVISIONS: [Protocol; 4] = [
        Protocol::Mcp20241105,
        Protocol::Mcp20250326,
        Protocol::Mcp20250618,
        Protocol::Mcp20251125,
    ];

    /// Replace the alias with the concrete revision it points at.
    pub fn resolve(self) -> Protocol {
        match self {
            Protocol::Mcp => Protocol::Mcp20251125,
            other => other,
        }
    }

    /// The MCP protocol version string, or `None` for REST.
    pub fn protocol_version(self) -> Option<&'static str> {
        match self.resolve() {
            Protocol::Mcp20241105 => Some(PROTOCOL_VERSION_2024_11_05),
            Protocol::Mcp20250326 => Some(PROTOCOL_VERSION_2025_03_26),
            Protocol::Mcp20250618 => Some(PROTOCOL_VERSION_2025_06_18),
            Protocol::Mcp20251125 | Protocol::Mcp => Some(PROTOCOL_VERSION_2025_11_25),
            Protocol::Toolbox => None,
        }
    }

    /// `true` for every MCP variant including the alias.
    pub fn is_mcp(self) -> bool {
        !matches!(self, Protocol::Toolbox)
    }

    fn as_str(self) -> &'static str {
        match self {
            Protocol::Mcp => "mcp",
            Protocol::Toolbox => "toolbox",
            other => other.protocol_version().unwrap_or("mcp"),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ToolboxError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcp" => Ok(Protocol::Mcp),
            "toolbox" | "rest" => Ok(Protocol::Toolbox),
            PROTOCOL_VERSION_2024_11_05 => Ok(Protocol::Mcp20241105),
            PROTOCOL_VERSION_2025_03_26 => Ok(Protocol::Mcp20250326),
            PROTOCOL_VERSION_2025_06_18 => Ok(Protocol::Mcp20250618),
            PROTOCOL_VERSION_2025_11_25 => Ok(Protocol::Mcp20251125),
            other => Err(ToolboxError::Config(format!(
                "Unknown protocol '{}'. Must be one of: mcp, toolbox, {}, {}, {}, {}",
                other,
                PROTOCOL_VERSION_2024_11_05,
                PROTOCOL_VERSION_2025_03_26,
                PROTOCOL_VERSION_2025_06_18,
                PROTOCOL_VERSION_2025_11_25
            ))),
        }
    }
}

impl TryFrom<String> for Protocol {
    type Error = ToolboxError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Protocol> for String {
    fn from(value: Protocol) -> Self {
        value.as_str().to_string()
    }
}
