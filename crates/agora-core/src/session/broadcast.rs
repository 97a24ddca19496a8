//! Fan-out of envelopes to every live session.
//!
//! An envelope is serialized once and the shared frame is pushed into each
//! session's outbound queue. Queues are unbounded, so a session that is
//! behind still gets every frame; only a queue whose writer has gone away
//! counts as a delivery failure. Failures are logged and counted, and the
//! fan-out carries on. Deregistration is left to the failing session's own
//! receive loop.

use std::sync::Arc;

use agora_types::envelope::Envelope;
use agora_types::error::ChatError;
use agora_types::session::SessionId;
use tracing::{debug, warn};

use super::registry::SessionRegistry;
use super::transport::{Outbound, OutboundSender};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers envelopes to the sessions in a [`SessionRegistry`].
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `envelope` to every session registered at call time.
    ///
    /// Only a serialization failure is returned as an error; delivery
    /// failures are reported in the [`BroadcastReport`].
    pub fn broadcast(&self, envelope: &Envelope) -> Result<BroadcastReport, ChatError> {
        let frame: Arc<str> = serde_json::to_string(envelope)?.into();
        let mut report = BroadcastReport::default();

        for (session_id, sender) in self.registry.snapshot() {
            match deliver(session_id, &sender, Arc::clone(&frame)) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(%session_id, kind = envelope.kind(), error = %err, "broadcast delivery failed");
                    report.failed += 1;
                }
            }
        }

        debug!(
            kind = envelope.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "broadcast complete"
        );
        Ok(report)
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}

fn deliver(session_id: SessionId, sender: &OutboundSender, frame: Arc<str>) -> Result<(), ChatError> {
    sender
        .send(Outbound::Text(frame))
        .map_err(|_| ChatError::DeliveryFailure {
            session_id,
            reason: "connection closed".to_string(),
        })
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("sessions", &self.registry.len())
            .finish()
    }
}
