//! Server addresses in `host[:port]` form.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Port a Java server listens on when the address does not name one.
pub const DEFAULT_PORT: u16 = 25565;

/// Reasons an address string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Nothing but whitespace was given.
    #[error("server address is empty")]
    Empty,

    /// The host part is empty or contains characters no host name can carry.
    #[error("invalid host: {0:?}")]
    InvalidHost(String),

    /// The port is not an integer in 1..=65535.
    #[error("invalid port: {0:?} (expected 1-65535)")]
    InvalidPort(String),
}

/// A normalized server address.
///
/// The host is lower-cased and the port defaults to [`DEFAULT_PORT`], so two
/// spellings of the same server compare equal and share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Build an address from parts, normalizing the host.
    pub fn new(host: impl AsRef<str>, port: u16) -> Result<Self, AddressError> {
        let host = host.as_ref().trim();
        if host.is_empty() || host.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(AddressError::InvalidHost(host.to_string()));
        }
        if port == 0 {
            return Err(AddressError::InvalidPort(port.to_string()));
        }
        Ok(Self {
            host: host.to_lowercase(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn is_ipv6(&self) -> bool {
        self.host.contains(':')
    }
}

fn parse_port(raw: &str) -> Result<u16, AddressError> {
    // `u16::from_str` also takes a leading `+`
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::InvalidPort(raw.to_string()));
    }
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(AddressError::InvalidPort(raw.to_string())),
    }
}

impl FromStr for ServerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        // Bracketed IPv6 literal, optionally followed by a port
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| AddressError::InvalidHost(s.to_string()))?;
            let port = match tail {
                "" => DEFAULT_PORT,
                _ => match tail.strip_prefix(':') {
                    Some(port) => parse_port(port)?,
                    None => return Err(AddressError::InvalidHost(s.to_string())),
                },
            };
            return Self::new(host, port);
        }

        match s.rsplit_once(':') {
            None => Self::new(s, DEFAULT_PORT),
            Some((host, _)) if host.contains(':') => {
                Err(AddressError::InvalidHost(s.to_string()))
            }
            Some((host, port)) => Self::new(host, parse_port(port)?),
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_ipv6(), self.port == DEFAULT_PORT) {
            (false, true) => write!(f, "{}", self.host),
            (false, false) => write!(f, "{}:{}", self.host, self.port),
            (true, true) => write!(f, "[{}]", self.host),
            (true, false) => write!(f, "[{}]:{}", self.host, self.port),
        }
    }
}
