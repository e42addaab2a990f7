//! Server status as reported by the origin.

use crate::MotdInput;

/// MOTD shown for servers that could not be reached.
pub const OFFLINE_MOTD: &str = "Server Offline";

/// Version reported for servers that could not be reached.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Player counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Players {
    pub online: u32,
    pub max: u32,
}

/// Game version the server advertises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Human-readable name, e.g. `"Paper 1.21.1"`.
    pub name: String,
    /// Protocol number, if reported.
    pub protocol: Option<i32>,
}

impl Default for Version {
    fn default() -> Self {
        Self {
            name: UNKNOWN_VERSION.to_string(),
            protocol: None,
        }
    }
}

/// A point-in-time status of a server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerStatus {
    pub online: bool,
    pub motd: MotdInput,
    pub players: Players,
    pub version: Version,
    /// Icon as a `data:` URI, exactly as the server sent it.
    pub favicon: Option<String>,
}

impl ServerStatus {
    /// Status of an online server with the given MOTD and nothing else known.
    pub fn online(motd: impl Into<MotdInput>) -> Self {
        Self {
            online: true,
            motd: motd.into(),
            players: Players::default(),
            version: Version::default(),
            favicon: None,
        }
    }

    /// Status synthesized for a server that could not be queried.
    pub fn offline() -> Self {
        Self {
            online: false,
            motd: MotdInput::text(OFFLINE_MOTD),
            players: Players::default(),
            version: Version::default(),
            favicon: None,
        }
    }
}
