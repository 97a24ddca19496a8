//! Wire envelopes exchanged over the chat WebSocket.
//!
//! Outbound traffic is an [`Envelope`], a JSON object tagged by `type`:
//!
//! ```json
//! {"type":"message","id":1,"username":"alice","text":"hi","timestamp":"..."}
//! {"type":"system","username":"System","text":"alice joined the chat","timestamp":"..."}
//! {"type":"delete","message_id":1}
//! ```
//!
//! Inbound traffic is parsed into an [`InboundFrame`]. A frame whose `type` is
//! `"delete"` is a delete request; any other or missing `type` is a chat
//! message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::message::{ChatMessage, SYSTEM_USERNAME};

/// Outbound payload sent to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// A persisted chat message (live or replayed).
    Message {
        id: i64,
        username: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    /// A server notice (join, leave, name taken).
    System {
        username: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    /// A message was removed from the store.
    Delete { message_id: i64 },
}

impl Envelope {
    /// Build a system notice stamped with the current time.
    pub fn system(text: impl Into<String>) -> Self {
        Envelope::System {
            username: SYSTEM_USERNAME.to_string(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn joined(username: &str) -> Self {
        Self::system(format!("{username} joined the chat"))
    }

    pub fn left(username: &str) -> Self {
        Self::system(format!("{username} left the chat"))
    }

    pub fn name_taken(username: &str) -> Self {
        Self::system(format!(
            "Username '{username}' is already taken. Please choose another name."
        ))
    }

    pub fn deleted(message_id: i64) -> Self {
        Envelope::Delete { message_id }
    }

    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Message { .. } => "message",
            Envelope::System { .. } => "system",
            Envelope::Delete { .. } => "delete",
        }
    }
}

impl From<ChatMessage> for Envelope {
    fn from(msg: ChatMessage) -> Self {
        Envelope::Message {
            id: msg.id,
            username: msg.username,
            text: msg.text,
            timestamp: msg.timestamp,
        }
    }
}

impl From<&ChatMessage> for Envelope {
    fn from(msg: &ChatMessage) -> Self {
        Envelope::from(msg.clone())
    }
}

/// A decoded client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Post a chat message. Any client-supplied timestamp is ignored.
    Chat { text: String },
    /// Request deletion of a stored message.
    Delete { message_id: i64 },
}

/// Loose shape of an inbound frame before discrimination.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type", default)]
    kind: Option<serde_json::Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    message_id: Option<i64>,
}

impl InboundFrame {
    /// Decode a text frame.
    ///
    /// Returns [`ChatError::MalformedFrame`] for invalid JSON or a missing
    /// required field (`text` for chat, `message_id` for delete).
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let frame: RawFrame = serde_json::from_str(raw)
            .map_err(|e| ChatError::MalformedFrame(e.to_string()))?;

        let is_delete = frame.kind.as_ref().and_then(|k| k.as_str()) == Some("delete");
        if is_delete {
            let message_id = frame.message_id.ok_or_else(|| {
                ChatError::MalformedFrame("delete frame missing message_id".to_string())
            })?;
            return Ok(InboundFrame::Delete { message_id });
        }

        let text = frame
            .text
            .ok_or_else(|| ChatError::MalformedFrame("chat frame missing text".to_string()))?;
        Ok(InboundFrame::Chat { text })
    }
}
