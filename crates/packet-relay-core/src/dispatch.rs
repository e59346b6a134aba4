//! Best-effort fan-out of normalized records.

use std::sync::Arc;

use crate::{ConnectionId, Frame, NormalizedRecord, SessionId, SessionRegistry};

/// Whether a publisher receives its own events back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoPolicy {
    /// Every member of the session receives the event, sender included.
    #[default]
    Include,
    /// The publishing connection is left out of its own broadcast.
    SkipSender,
}

/// Outcome counts for one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Frames queued on an open connection.
    pub delivered: usize,
    /// Members skipped because they were not writable or were the sender.
    pub skipped: usize,
    /// Members whose send failed after the writability check.
    pub failed: usize,
}

/// Delivers records to every writable member of a session.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    echo: EchoPolicy,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(registry: Arc<SessionRegistry>, echo: EchoPolicy) -> Self {
        Self { registry, echo }
    }

    #[must_use]
    pub const fn echo_policy(&self) -> EchoPolicy {
        self.echo
    }

    /// Broadcast `record` to every writable member of `id`.
    pub fn broadcast(&self, id: &SessionId, record: &NormalizedRecord) -> DeliveryReport {
        self.dispatch(id, record, None)
    }

    /// Broadcast on behalf of a publishing connection, applying the echo
    /// policy to `origin`.
    pub fn broadcast_from(
        &self,
        id: &SessionId,
        origin: ConnectionId,
        record: &NormalizedRecord,
    ) -> DeliveryReport {
        self.dispatch(id, record, Some(origin))
    }

    fn dispatch(
        &self,
        id: &SessionId,
        record: &NormalizedRecord,
        origin: Option<ConnectionId>,
    ) -> DeliveryReport {
        let frame = match serde_json::to_string(record) {
            Ok(json) => Frame::from(json),
            Err(e) => {
                tracing::error!(session_id = %id, "Failed to serialize record: {e}");
                return DeliveryReport::default();
            }
        };

        let excluded = match self.echo {
            EchoPolicy::Include => None,
            EchoPolicy::SkipSender => origin,
        };

        let mut report = DeliveryReport::default();
        for conn in self.registry.snapshot(id) {
            let conn_id = conn.id();
            if Some(conn_id) == excluded || !conn.is_open() {
                report.skipped += 1;
                continue;
            }
            match conn.send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::debug!(session_id = %id, connection_id = %conn_id, "Dropped frame: {e}");
                    report.failed += 1;
                }
            }
        }

        tracing::trace!(
            session_id = %id,
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "Broadcast complete"
        );
        report
    }
}
