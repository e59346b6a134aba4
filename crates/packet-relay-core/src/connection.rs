//! Connection identity and the outbound side of a duplex link.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::SendError;

/// Session identifier.
///
/// Opaque token; the only requirement is that it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parse a session id from a routing token, rejecting empty tokens.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a connection (server-generated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An encoded outbound payload.
///
/// Cloning shares the underlying buffer, so one encoding can be handed to
/// every recipient of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Arc<str>);

impl Frame {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Frame {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

/// Outbound half of a consumer link, as seen by the registry.
pub trait Connection: Send + Sync {
    /// Stable identity of this connection.
    fn id(&self) -> ConnectionId;

    /// Whether the link can currently accept frames.
    fn is_open(&self) -> bool;

    /// Queue a frame for delivery.
    ///
    /// # Errors
    /// Returns error if the link is closed.
    fn send(&self, frame: Frame) -> Result<(), SendError>;
}

/// Connection backed by an unbounded channel.
///
/// The receiving half is drained by a transport writer task. Once that task
/// drops the receiver the connection reports itself closed.
pub struct ChannelConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Frame>,
}

impl ChannelConnection {
    /// Create a new connection and the receiver its frames arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Self {
            id: ConnectionId::new(),
            tx,
        };
        (conn, rx)
    }
}

impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, frame: Frame) -> Result<(), SendError> {
        self.tx.send(frame).map_err(|_| SendError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_rejects_empty() {
        assert!(SessionId::parse("").is_none());
        assert_eq!(SessionId::parse("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_channel_connection_closes_with_receiver() {
        let (conn, rx) = ChannelConnection::new();
        assert!(conn.is_open());
        conn.send(Frame::from("x".to_string())).unwrap();

        drop(rx);
        assert!(!conn.is_open());
        assert!(matches!(
            conn.send(Frame::from("y".to_string())),
            Err(SendError::Closed)
        ));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let (a, _rx_a) = ChannelConnection::new();
        let (b, _rx_b) = ChannelConnection::new();
        assert_ne!(a.id(), b.id());
    }
}
