//! Registry of live chat sessions with display-name uniqueness.
//!
//! The registry is the one piece of mutable state shared by every
//! connection task. Sessions are keyed by [`SessionId`]; a secondary name
//! index maps each active display name to the session holding it.
//!
//! Reservation holds the name index entry lock while inserting into the
//! session table, so of two concurrent reservations for the same name only
//! one can succeed. Broadcast iteration works on a snapshot copy, so a
//! session that connects or disconnects mid-fan-out never corrupts or
//! deadlocks it.

use agora_types::error::ChatError;
use agora_types::session::{SessionId, SessionInfo};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::transport::OutboundSender;

struct SessionEntry {
    info: SessionInfo,
    sender: OutboundSender,
}

/// In-memory table of live sessions.
#[derive(Default)]
pub struct SessionRegistry {
    /// Primary table (session id -> session).
    sessions: DashMap<SessionId, SessionEntry>,
    /// Name index (username -> holder). Case-sensitive exact match.
    names: DashMap<String, SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `info.username` for the session and admit it.
    ///
    /// Fails with [`ChatError::NameTaken`] if another active session holds the
    /// name; the registry is left untouched in that case. Re-reserving a name
    /// the same session already holds is a no-op success.
    pub fn reserve(
        &self,
        info: SessionInfo,
        sender: OutboundSender,
    ) -> Result<(), ChatError> {
        match self.names.entry(info.username.clone()) {
            Entry::Occupied(holder) if *holder.get() != info.id => {
                debug!(username = %info.username, holder = %holder.get(), "name already reserved");
                Err(ChatError::NameTaken(info.username))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                let id = info.id;
                debug!(session_id = %id, username = %info.username, "session admitted");
                self.sessions.insert(id, SessionEntry { info, sender });
                slot.insert(id);
                Ok(())
            }
        }
    }

    /// Remove a session. Returns its metadata if it was present.
    ///
    /// Idempotent: removing an absent session is a no-op.
    pub fn remove(&self, id: &SessionId) -> Option<SessionInfo> {
        let (_, entry) = self.sessions.remove(id)?;
        self.names
            .remove_if(&entry.info.username, |_, holder| holder == id);
        debug!(session_id = %id, username = %entry.info.username, "session removed");
        Some(entry.info)
    }

    /// Whether an active session holds `username`.
    ///
    /// When `excluding` is given, that session is not counted as a conflict.
    pub fn is_taken(&self, username: &str, excluding: Option<SessionId>) -> bool {
        self.names
            .get(username)
            .is_some_and(|holder| Some(*holder) != excluding)
    }

    /// Whether the session is currently registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Copy of every session's id and outbound queue, taken at call time.
    pub fn snapshot(&self) -> Vec<(SessionId, OutboundSender)> {
        self.sessions
            .iter()
            .map(|entry| (*entry.key(), entry.sender.clone()))
            .collect()
    }

    /// Active display names, sorted.
    pub fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("names", &self.names.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
