//! Error types for adapters.

use std::io;

use thiserror::Error;

/// Errors that can occur when querying an origin server.
///
/// Both variants describe a server that is, for the caller's purposes,
/// offline. The error is `Clone` so a single failed query can be handed to
/// every caller that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    /// The server could not be reached or answered with something other
    /// than a valid status response.
    #[error("origin unavailable: {0}")]
    Unavailable(String),

    /// The query did not finish in time.
    #[error("origin timed out")]
    Timeout,
}

impl From<io::Error> for OriginError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => OriginError::Timeout,
            _ => OriginError::Unavailable(err.to_string()),
        }
    }
}
