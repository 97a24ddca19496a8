//! Shared chat state: message store, session registry, and broadcaster.
//!
//! One `ChatHub` exists per process. Each connection opens a
//! [`ChatSession`] from it and drives that session to completion.

use std::sync::Arc;

use agora_types::envelope::Envelope;
use agora_types::session::{SessionId, SessionInfo};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::repository::MessageStore;
use crate::session::{BroadcastReport, Broadcaster, SessionRegistry};

use super::session::ChatSession;

/// Tunables for a [`ChatHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    /// The one username allowed to delete any message.
    pub privileged_username: String,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            privileged_username: "aspect".to_string(),
        }
    }
}

/// Process-wide chat state shared by every connection.
///
/// Generic over `MessageStore` so agora-core never depends on agora-infra.
pub struct ChatHub<S: MessageStore> {
    store: Arc<S>,
    registry: Arc<SessionRegistry>,
    broadcaster: Broadcaster,
    settings: HubSettings,
    shutdown: CancellationToken,
    /// Store mutations hold this shared until their broadcast is queued;
    /// admission holds it exclusively from registration through replay.
    history_gate: RwLock<()>,
}

impl<S: MessageStore> ChatHub<S> {
    pub fn new(store: Arc<S>, settings: HubSettings) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        Self {
            store,
            broadcaster: Broadcaster::new(Arc::clone(&registry)),
            registry,
            settings,
            shutdown: CancellationToken::new(),
            history_gate: RwLock::new(()),
        }
    }

    /// Start a session for a new connection. Nothing is reserved until the
    /// session is run.
    pub fn open_session(
        self: &Arc<Self>,
        username: impl Into<String>,
        client_id: impl Into<String>,
    ) -> ChatSession<S> {
        let info = SessionInfo {
            id: SessionId::new(),
            username: username.into(),
            client_id: client_id.into(),
        };
        ChatSession::new(Arc::clone(self), info)
    }

    /// Whether `username` is free among active sessions.
    pub fn is_username_available(&self, username: &str) -> bool {
        !self.registry.is_taken(username, None)
    }

    /// Deletion is allowed for the message's author and the privileged user.
    pub fn can_delete(&self, requester: &str, author: &str) -> bool {
        requester == author || requester == self.settings.privileged_username
    }

    /// Fan out an envelope, logging rather than propagating failures.
    pub fn broadcast(&self, envelope: &Envelope) -> BroadcastReport {
        match self.broadcaster.broadcast(envelope) {
            Ok(report) => report,
            Err(err) => {
                error!(kind = envelope.kind(), error = %err, "failed to serialize broadcast");
                BroadcastReport::default()
            }
        }
    }

    /// Held while a store mutation commits and its broadcast is queued.
    pub(crate) async fn mutation_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.history_gate.read().await
    }

    /// Held while a joining session registers and queues its replay, so
    /// every message reaches it exactly once: in the replay or live.
    pub(crate) async fn admission_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.history_gate.write().await
    }

    /// End every session's receive loop. Sessions tear down normally.
    pub fn shutdown(&self) {
        info!(active_sessions = self.registry.len(), "shutting down chat hub");
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }
}

impl<S: MessageStore> std::fmt::Debug for ChatHub<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHub")
            .field("active_sessions", &self.registry.len())
            .field("privileged_username", &self.settings.privileged_username)
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn hub() -> Arc<ChatHub<MemoryStore>> {
        Arc::new(ChatHub::new(Arc::new(MemoryStore::default()), HubSettings::default()))
    }

    #[test]
    fn author_and_privileged_user_can_delete() {
        let hub = hub();
        assert!(hub.can_delete("alice", "alice"));
        assert!(hub.can_delete("aspect", "alice"));
        assert!(!hub.can_delete("bob", "alice"));
        assert!(!hub.can_delete("Aspect", "alice"));
        assert!(!hub.can_delete("admin", "alice"));
    }

    #[test]
    fn open_session_assigns_distinct_ids() {
        let hub = hub();
        let a = hub.open_session("alice", "c1");
        let b = hub.open_session("alice", "c1");
        assert_ne!(a.info().id, b.info().id);
        // Opening alone reserves nothing.
        assert!(hub.is_username_available("alice"));
    }

    #[test]
    fn shutdown_cancels_token() {
        let hub = hub();
        assert!(!hub.shutdown_token().is_cancelled());
        hub.shutdown();
        assert!(hub.shutdown_token().is_cancelled());
    }

    #[test]
    fn debug_impl() {
        let debug = format!("{:?}", hub());
        assert!(debug.contains("ChatHub"));
        assert!(debug.contains("active_sessions"));
    }
}
