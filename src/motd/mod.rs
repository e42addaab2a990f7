//! Normalization of the MOTD shapes a server can report.
//!
//! [`classify`] is the only place that inspects the shape of a
//! [`MotdInput`](motd_embed_types::MotdInput); [`normalize`] then walks the
//! resulting [`Component`] tree and produces text runs.

mod classify;
mod normalize;

pub use classify::{classify, Component, MalformedComponentError};
pub use normalize::normalize;
