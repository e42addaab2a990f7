//! Layered settings: built-in defaults, an optional TOML file, then
//! `MOTD_EMBED_*` environment variables.
//!
//! Nested keys use `__` in the environment, so `cache.ttl_secs` is read from
//! `MOTD_EMBED_CACHE__TTL_SECS`. List values (`http.allowed_origins`) are
//! comma separated.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "MOTD_EMBED";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub listen_addr: String,
    pub log_level: String,
    pub cache: CacheSettings,
    pub origin: OriginSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// How long a fetched status stays fresh.
    pub ttl_secs: u64,
    /// Upper bound on cached servers; `0` disables the bound.
    pub max_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OriginSettings {
    /// Budget for one status query, connect included.
    pub timeout_ms: u64,
    /// Protocol version announced in the handshake.
    pub protocol_version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Where the stylesheet, background and fallback icon are served from.
    pub static_base_url: String,
    /// Origins allowed to embed; `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Budget for one HTTP request, independent of the origin timeout.
    pub request_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
            cache: CacheSettings::default(),
            origin: OriginSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 30,
            max_entries: 1000,
        }
    }
}

impl Default for OriginSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            protocol_version: 47,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            static_base_url: "/static".to_string(),
            allowed_origins: vec!["*".to_string()],
            request_timeout_ms: 10_000,
        }
    }
}

impl Settings {
    /// Load settings from defaults, the optional file and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    /// Like [`Settings::load`] with an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        self.listen_socket_addr()?;
        if self.log_level.trim().is_empty() {
            bail!("log_level must not be empty");
        }
        if self.origin.timeout_ms == 0 {
            bail!("origin.timeout_ms must be greater than zero");
        }
        if self.http.request_timeout_ms == 0 {
            bail!("http.request_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn listen_socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("invalid listen_addr {:?}", self.listen_addr))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn max_entries(&self) -> Option<usize> {
        Some(self.cache.max_entries).filter(|&n| n > 0)
    }

    pub fn origin_timeout(&self) -> Duration {
        Duration::from_millis(self.origin.timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.http.request_timeout_ms)
    }

    /// Base URL for static assets, without a trailing slash.
    pub fn static_base_url(&self) -> &str {
        self.http.static_base_url.trim_end_matches('/')
    }
}

/// The `MOTD_EMBED_*` environment source.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("http.allowed_origins")
}
