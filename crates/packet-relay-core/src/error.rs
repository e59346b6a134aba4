//! Relay error types.

use thiserror::Error;

/// Errors surfaced while handling a single connection.
///
/// None of these are fatal to the process; each one is scoped to the
/// connection that produced it.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
    #[error("Missing session id")]
    MissingSessionId,
    #[error("Connection is not active")]
    InactiveConnection,
}

/// Send error for a single recipient.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Connection closed")]
    Closed,
}
