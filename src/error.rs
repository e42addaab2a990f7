//! Errors surfaced by [`MotdService`](crate::service::MotdService).

use thiserror::Error;

use motd_embed_types::AddressError;

/// Why an embed could not be produced.
///
/// An unreachable server is not an error here: the service renders an
/// offline document instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested address is not a valid `host[:port]`.
    #[error("invalid server address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Something went wrong that the caller cannot fix.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the caller sent bad input, as opposed to a server-side fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::InvalidAddress(_))
    }
}
