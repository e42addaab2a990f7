//! # motd-embed
//!
//! Renders the message of the day (MOTD) of a Minecraft Java server as
//! styled, embeddable HTML, with a short-lived status cache in front of the
//! server query.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           MotdService                            │
//! │                                                                  │
//! │  "host:port" ──▶ ServerAddress ──▶ FetchCoordinator ──▶ Fetcher  │
//! │                                       │  (single flight)         │
//! │                                       ▼                          │
//! │                                   CacheStore (TTL)               │
//! │                                       │                          │
//! │                                       ▼ ServerStatus             │
//! │   classify ──▶ normalize ──▶ TextRun[] ──▶ render_runs ──▶ page  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`format`]**: `§` code tokenizer and the formatting state machine
//! - **[`motd`]**: classification of the MOTD shapes a server reports and
//!   flattening into text runs
//! - **[`render`]**: escaped, classed span markup and the embed document
//! - **[`cache`]**: TTL store and single-flight fetch coordinator
//! - **[`service`]**: [`MotdService`], wiring all of the above to a
//!   [`StatusFetcher`](motd_embed_adapters::StatusFetcher)
//! - **[`server`]**: hyper HTTP front end
//! - **[`config`]**: layered settings for the binary
//!
//! ## Example
//!
//! ```
//! use motd_embed::format::parse_runs;
//! use motd_embed::render::render_runs;
//!
//! let html = render_runs(&parse_runs("§a§lHello§r World"));
//! assert_eq!(
//!     html,
//!     concat!(
//!         r#"<span class="mcformat mcformat-green mcformat-bold">Hello</span>"#,
//!         r#"<span class="mcformat"> World</span>"#,
//!     )
//! );
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod motd;
pub mod render;
pub mod server;
pub mod service;

pub use motd_embed_adapters as adapters;
pub use motd_embed_types as types;

pub use cache::{CacheStore, FetchCoordinator, ResolveError};
pub use config::Settings;
pub use error::ServiceError;
pub use format::{parse_runs, FormatCode, FormatState, TextRun};
pub use motd::{classify, normalize, Component, MalformedComponentError};
pub use render::{render_runs, EmbedPage};
pub use server::{AppState, CorsPolicy};
pub use service::{render_motd, MotdService, MotdServiceBuilder};
