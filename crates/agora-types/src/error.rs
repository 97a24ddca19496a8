use thiserror::Error;

use crate::session::SessionId;

/// Failures in the chat core.
///
/// Only `NameTaken` is ever surfaced to a client (as a system notice before
/// the connection is closed). Everything else is logged server-side and
/// contained at the session boundary.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("username '{0}' is already taken")]
    NameTaken(String),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("delivery to session {session_id} failed: {reason}")]
    DeliveryFailure { session_id: SessionId, reason: String },

    #[error("message store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        ChatError::StoreUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}

/// Errors from repository operations (used by trait definitions in agora-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Rejected message or username input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username is {len} characters, maximum is {max}")]
    UsernameTooLong { len: usize, max: usize },

    #[error("message text is {len} characters, maximum is {max}")]
    TextTooLong { len: usize, max: usize },
}

/// Failure reading from a client connection.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);
