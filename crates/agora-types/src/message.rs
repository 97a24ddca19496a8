//! Persisted chat message types.
//!
//! `ChatMessage` is the stored entity; `NewMessage` is the validated form
//! handed to a `MessageStore` for appending. Both are immutable once built:
//! there is no edit operation.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum display name length, in characters.
pub const MAX_USERNAME_LEN: usize = 50;

/// Maximum message body length, in characters.
pub const MAX_TEXT_LEN: usize = 500;

/// Display name used for server-generated notices.
pub const SYSTEM_USERNAME: &str = "System";

/// A chat message as persisted by the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Store-assigned id, monotonic and unique.
    pub id: i64,
    pub username: String,
    pub text: String,
    /// Server-assigned creation time (UTC, microsecond precision).
    pub timestamp: DateTime<Utc>,
}

/// A validated message awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl NewMessage {
    /// Build a message stamped with the current server time.
    pub fn new(
        username: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::with_timestamp(username, text, Utc::now())
    }

    /// Build a message with an explicit timestamp.
    ///
    /// The timestamp is truncated to microseconds so the value handed back by
    /// the store compares equal to the one later read from it.
    pub fn with_timestamp(
        username: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let username = username.into();
        let text = text.into();

        validate_username(&username)?;
        let len = text.chars().count();
        if len > MAX_TEXT_LEN {
            return Err(ValidationError::TextTooLong { len, max: MAX_TEXT_LEN });
        }

        Ok(Self {
            username,
            text,
            timestamp: timestamp.trunc_subsecs(6),
        })
    }

    /// Attach the store-assigned id.
    pub fn into_message(self, id: i64) -> ChatMessage {
        ChatMessage {
            id,
            username: self.username,
            text: self.text,
            timestamp: self.timestamp,
        }
    }
}

/// Check a display name against the non-empty and length bounds.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    let len = username.chars().count();
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::UsernameTooLong { len, max: MAX_USERNAME_LEN });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_accepts_valid_input() {
        let msg = NewMessage::new("alice", "hi").unwrap();
        assert_eq!(msg.username, "alice");
        assert_eq!(msg.text, "hi");
    }

    #[test]
    fn new_message_truncates_to_micros() {
        let ts = Utc::now();
        let msg = NewMessage::with_timestamp("alice", "hi", ts).unwrap();
        assert_eq!(msg.timestamp.timestamp_subsec_nanos() % 1_000, 0);
        assert!(msg.timestamp <= ts);
    }

    #[test]
    fn new_message_keeps_empty_and_blank_text() {
        assert_eq!(NewMessage::new("alice", "").unwrap().text, "");
        assert_eq!(NewMessage::new("alice", "   ").unwrap().text, "   ");
    }

    #[test]
    fn new_message_rejects_long_text() {
        let text = "x".repeat(MAX_TEXT_LEN + 1);
        let err = NewMessage::new("alice", text).unwrap_err();
        assert!(matches!(err, ValidationError::TextTooLong { len: 501, max: 500 }));
    }

    #[test]
    fn text_limit_counts_chars_not_bytes() {
        let text = "ж".repeat(MAX_TEXT_LEN);
        assert!(NewMessage::new("alice", text).is_ok());
    }

    #[test]
    fn validate_username_bounds() {
        assert!(validate_username("bob").is_ok());
        assert!(matches!(validate_username(""), Err(ValidationError::EmptyUsername)));
        assert!(matches!(
            validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)),
            Err(ValidationError::UsernameTooLong { .. })
        ));
    }

    #[test]
    fn into_message_keeps_fields() {
        let new = NewMessage::new("alice", "hello").unwrap();
        let ts = new.timestamp;
        let msg = new.into_message(7);
        assert_eq!(msg.id, 7);
        assert_eq!(msg.username, "alice");
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.timestamp, ts);
    }
}
