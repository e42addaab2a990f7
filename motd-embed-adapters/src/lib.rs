//! # motd-embed-adapters
//!
//! Origin adapters that query a Minecraft server for its status.
//!
//! Every adapter implements [`StatusFetcher`], the contract the rest of
//! motd-embed consumes: given a [`ServerAddress`], produce a
//! [`ServerStatus`] or fail with an [`OriginError`].
//!
//! ## Supported Origins
//!
//! - **Java edition** (`java` feature) - the Server List Ping exchange over TCP
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "java")]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use motd_embed_adapters::java::JavaStatusClient;
//! use motd_embed_adapters::StatusFetcher;
//!
//! let client = JavaStatusClient::builder().protocol_version(767).build();
//! let status = client.fetch(&"play.example.com".parse()?).await?;
//!
//! println!("{} / {} players", status.players.online, status.players.max);
//! # Ok(())
//! # }
//! ```

pub mod error;

#[cfg(feature = "java")]
pub mod java;

use async_trait::async_trait;

pub use error::OriginError;

// Re-export types for convenience
pub use motd_embed_types::{MotdInput, Players, ServerAddress, ServerStatus, Version};

/// A source of server status.
///
/// Implementations perform the (slow, rate-limit-sensitive) network query.
/// They are not expected to cache or to bound their own running time; the
/// caller does both.
#[async_trait]
pub trait StatusFetcher: Send + Sync + std::fmt::Debug {
    /// Query the server at `address`.
    async fn fetch(&self, address: &ServerAddress) -> Result<ServerStatus, OriginError>;
}
