//! Session identity types.
//!
//! A session is the server-side view of one live WebSocket connection. It is
//! never persisted; the registry in `agora-core` owns every live session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a live session, wrapping a UUID v7 (time-sortable).
///
/// Sessions are keyed by this id rather than by display name, so the name
/// index can be checked and rebuilt independently of the session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new SessionId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Read-only metadata describing an admitted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    /// Display name, unique among active sessions.
    pub username: String,
    /// Opaque client-supplied correlation token (not required unique).
    pub client_id: String,
}

/// Lifecycle state of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Connection accepted, name not yet reserved.
    Connecting,
    /// Name reserved, history not yet replayed.
    Admitted,
    /// In the receive loop.
    Active,
    /// Terminal. No further I/O.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Connecting => "connecting",
            SessionState::Admitted => "admitted",
            SessionState::Active => "active",
            SessionState::Closed => "closed",
        };
        write!(f, "{s}")
    }
}
