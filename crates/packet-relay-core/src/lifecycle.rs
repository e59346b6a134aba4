//! Per-connection lifecycle: accept, inbound frames, close.

use std::sync::Arc;

use crate::{
    Connection, DeliveryReport, RawEvent, Relay, RelayError, SessionId, normalize,
};

/// Lifecycle phase of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepted, session id not yet resolved.
    Pending,
    /// Registered; publishes and receives broadcasts.
    Active,
    /// Terminal. Deregistered, or rejected at accept.
    Closed,
}

/// State machine for one connection.
///
/// Dropping an `Active` lifecycle closes it, so an aborted handler never
/// leaves a stale member in the registry.
pub struct ConnectionLifecycle {
    relay: Relay,
    connection: Arc<dyn Connection>,
    session: Option<SessionId>,
    phase: Phase,
}

impl ConnectionLifecycle {
    /// Resolve the session id from `session_token` and register the
    /// connection under it.
    ///
    /// An empty token moves straight to [`Phase::Closed`]; the caller is
    /// expected to close the transport.
    #[must_use]
    pub fn accept(relay: Relay, session_token: &str, connection: Arc<dyn Connection>) -> Self {
        let mut lifecycle = Self {
            relay,
            connection,
            session: None,
            phase: Phase::Pending,
        };

        let conn_id = lifecycle.connection.id();
        if let Some(id) = SessionId::parse(session_token) {
            lifecycle
                .relay
                .registry()
                .register(&id, Arc::clone(&lifecycle.connection));
            tracing::info!(session_id = %id, connection_id = %conn_id, "Client connected");
            lifecycle.session = Some(id);
            lifecycle.phase = Phase::Active;
        } else {
            tracing::warn!(connection_id = %conn_id, "Rejected connection: {}", RelayError::MissingSessionId);
            lifecycle.phase = Phase::Closed;
        }

        lifecycle
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Handle one inbound frame: decode, normalize, broadcast.
    ///
    /// A malformed frame is logged and returned as an error, but leaves the
    /// connection active.
    ///
    /// # Errors
    /// Returns error if the frame is malformed or the connection is not active.
    pub fn handle_frame(&self, text: &str) -> Result<DeliveryReport, RelayError> {
        let (Phase::Active, Some(id)) = (self.phase, self.session.as_ref()) else {
            return Err(RelayError::InactiveConnection);
        };

        let raw = RawEvent::from_json(text).map_err(|e| {
            tracing::warn!(
                session_id = %id,
                connection_id = %self.connection.id(),
                "Error processing message: {e}"
            );
            RelayError::MalformedFrame(e)
        })?;

        let record = normalize(&raw);
        Ok(self
            .relay
            .dispatcher()
            .broadcast_from(id, self.connection.id(), &record))
    }

    /// Transport closed. Deregisters an active connection; idempotent.
    pub fn close(&mut self) {
        if let (Phase::Active, Some(id)) = (self.phase, self.session.as_ref()) {
            let conn_id = self.connection.id();
            self.relay.registry().deregister(id, &conn_id);
            tracing::info!(session_id = %id, connection_id = %conn_id, "Client disconnected");
        }
        self.phase = Phase::Closed;
    }
}

impl Drop for ConnectionLifecycle {
    fn drop(&mut self) {
        self.close();
    }
}
