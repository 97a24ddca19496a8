//! Per-connection chat session state machine.
//!
//! A session moves `Connecting -> Admitted -> Active -> Closed`:
//!
//! - **Connecting:** reserve the display name. On conflict, send a single
//!   "name taken" notice to this connection, close it, and stop. Nothing is
//!   broadcast and history is not touched.
//! - **Admitted:** replay stored history to this connection only, then
//!   announce the join to everyone (including this session). Registration
//!   and the history read happen under the hub's admission guard, so a
//!   message committed concurrently arrives once, either replayed or live.
//! - **Active:** read frames until the peer leaves, a frame is malformed,
//!   the store fails, or the hub shuts down. Every store mutation commits
//!   before its broadcast.
//! - **Closed:** deregister and announce the departure.

use std::sync::Arc;

use agora_types::envelope::{Envelope, InboundFrame};
use agora_types::error::ChatError;
use agora_types::message::NewMessage;
use agora_types::session::{SessionInfo, SessionState};
use tracing::{debug, info, warn};

use crate::repository::MessageStore;
use crate::session::{FrameSource, Outbound, OutboundSender};

use super::hub::ChatHub;

/// Why a session reached `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Another active session holds the requested name.
    NameTaken,
    /// The peer disconnected or closed the connection.
    Disconnected,
    /// The client sent a frame that could not be decoded.
    MalformedFrame,
    /// The message store failed mid-operation.
    StoreUnavailable,
    /// The hub is shutting down.
    Shutdown,
}

impl std::fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionEnd::NameTaken => "name_taken",
            SessionEnd::Disconnected => "disconnected",
            SessionEnd::MalformedFrame => "malformed_frame",
            SessionEnd::StoreUnavailable => "store_unavailable",
            SessionEnd::Shutdown => "shutdown",
        };
        write!(f, "{s}")
    }
}

/// One connection's session, driven to completion by [`ChatSession::run`].
pub struct ChatSession<S: MessageStore> {
    hub: Arc<ChatHub<S>>,
    info: SessionInfo,
    state: SessionState,
}

impl<S: MessageStore> ChatSession<S> {
    pub(crate) fn new(hub: Arc<ChatHub<S>>, info: SessionInfo) -> Self {
        Self {
            hub,
            info,
            state: SessionState::Connecting,
        }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session from admission to teardown.
    ///
    /// `outbound` is this connection's queue; the caller's writer task
    /// drains it into the socket.
    pub async fn run<F: FrameSource>(
        mut self,
        mut frames: F,
        outbound: OutboundSender,
    ) -> SessionEnd {
        let session_id = self.info.id;
        let username = self.info.username.clone();
        let hub = Arc::clone(&self.hub);

        let admission = hub.admission_guard().await;
        if let Err(err) = hub.registry().reserve(self.info.clone(), outbound.clone()) {
            drop(admission);
            info!(%session_id, %username, client_id = %self.info.client_id, error = %err, "admission rejected");
            self.send_direct(&outbound, &Envelope::name_taken(&username));
            let _ = outbound.send(Outbound::Close);
            self.transition(SessionState::Closed);
            return SessionEnd::NameTaken;
        }
        self.transition(SessionState::Admitted);
        info!(%session_id, %username, client_id = %self.info.client_id, "session admitted");

        let replayed = self.replay_history(&outbound).await;
        drop(admission);
        if let Err(end) = replayed {
            // The join was never announced, so no departure notice either.
            hub.registry().remove(&session_id);
            let _ = outbound.send(Outbound::Close);
            self.transition(SessionState::Closed);
            return end;
        }

        self.hub.broadcast(&Envelope::joined(&username));
        self.transition(SessionState::Active);

        let end = self.receive_loop(&mut frames).await;

        self.hub.registry().remove(&session_id);
        self.hub.broadcast(&Envelope::left(&username));
        let _ = outbound.send(Outbound::Close);
        self.transition(SessionState::Closed);
        info!(%session_id, %username, reason = %end, "session closed");
        end
    }

    async fn replay_history(&self, outbound: &OutboundSender) -> Result<(), SessionEnd> {
        let history = match self.hub.store().list_ordered().await {
            Ok(history) => history,
            Err(err) => {
                let err = ChatError::from(err);
                warn!(session_id = %self.info.id, error = %err, "history replay failed");
                return Err(SessionEnd::StoreUnavailable);
            }
        };

        let count = history.len();
        for msg in history {
            if !self.send_direct(outbound, &Envelope::from(msg)) {
                return Err(SessionEnd::Disconnected);
            }
        }
        debug!(session_id = %self.info.id, count, "history replayed");
        Ok(())
    }

    async fn receive_loop<F: FrameSource>(&self, frames: &mut F) -> SessionEnd {
        let shutdown = self.hub.shutdown_token().clone();
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => return SessionEnd::Shutdown,
                next = frames.recv() => next,
            };

            let raw = match next {
                Ok(Some(raw)) => raw,
                Ok(None) => return SessionEnd::Disconnected,
                Err(err) => {
                    debug!(session_id = %self.info.id, error = %err, "connection lost");
                    return SessionEnd::Disconnected;
                }
            };

            let frame = match InboundFrame::parse(&raw) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(session_id = %self.info.id, raw = %raw, error = %err, "aborting session");
                    return SessionEnd::MalformedFrame;
                }
            };

            let result = match frame {
                InboundFrame::Chat { text } => self.handle_chat(text).await,
                InboundFrame::Delete { message_id } => self.handle_delete(message_id).await,
            };

            if let Err(err) = result {
                warn!(session_id = %self.info.id, error = %err, "aborting session");
                return SessionEnd::StoreUnavailable;
            }
        }
    }

    async fn handle_chat(&self, text: String) -> Result<(), ChatError> {
        let new = match NewMessage::new(&self.info.username, text) {
            Ok(new) => new,
            Err(err) => {
                warn!(session_id = %self.info.id, error = %err, "dropping chat message");
                return Ok(());
            }
        };

        let _guard = self.hub.mutation_guard().await;
        let stored = self.hub.store().append(&new).await?;
        debug!(session_id = %self.info.id, message_id = stored.id, "message stored");
        self.hub.broadcast(&Envelope::from(stored));
        Ok(())
    }

    /// Unauthorized, unknown, and already-deleted ids are dropped silently.
    async fn handle_delete(&self, message_id: i64) -> Result<(), ChatError> {
        let Some(msg) = self.hub.store().get(message_id).await? else {
            debug!(session_id = %self.info.id, message_id, "delete ignored: not found");
            return Ok(());
        };

        if !self.hub.can_delete(&self.info.username, &msg.username) {
            debug!(
                session_id = %self.info.id,
                message_id,
                author = %msg.username,
                "delete ignored: not authorized"
            );
            return Ok(());
        }

        let _guard = self.hub.mutation_guard().await;
        if self.hub.store().delete_by_id(message_id).await? {
            info!(session_id = %self.info.id, message_id, "message deleted");
            self.hub.broadcast(&Envelope::deleted(message_id));
        } else {
            debug!(session_id = %self.info.id, message_id, "delete ignored: already removed");
        }
        Ok(())
    }

    /// Queue an envelope for this connection only.
    /// Returns `false` once the writer side is gone.
    fn send_direct(&self, outbound: &OutboundSender, envelope: &Envelope) -> bool {
        let frame = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(err) => {
                warn!(session_id = %self.info.id, error = %err, "failed to serialize envelope");
                return true;
            }
        };
        outbound.send(Outbound::Text(frame.into())).is_ok()
    }

    fn transition(&mut self, next: SessionState) {
        debug!(session_id = %self.info.id, from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
