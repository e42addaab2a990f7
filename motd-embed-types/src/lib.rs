//! # motd-embed-types
//!
//! Core types shared by the motd-embed crates: the address of a Minecraft
//! Java server, the status it reports, and the MOTD shapes that status can
//! carry.
//!
//! ## Example
//!
//! ```rust
//! use motd_embed_types::{MotdInput, ServerAddress, ServerStatus, DEFAULT_PORT};
//!
//! let address: ServerAddress = "Play.Example.com".parse().unwrap();
//! assert_eq!(address.host(), "play.example.com");
//! assert_eq!(address.port(), DEFAULT_PORT);
//!
//! let status = ServerStatus::offline();
//! assert!(!status.online);
//! assert_eq!(status.motd, MotdInput::text("Server Offline"));
//! ```

mod address;
mod motd;
mod status;

pub use address::*;
pub use motd::*;
pub use status::*;
