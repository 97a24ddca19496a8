//! SQLite message store implementation.
//!
//! Implements `MessageStore` from `agora-core` using sqlx with split
//! read/write pools. Appends and deletes go through the single writer
//! connection, so ids are assigned in commit order and a delete of a given
//! id removes a row for exactly one caller.

use agora_core::repository::MessageStore;
use agora_types::error::RepositoryError;
use agora_types::message::{ChatMessage, NewMessage};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageStore`.
#[derive(Clone)]
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct MessageRow {
    id: i64,
    username: String,
    text: String,
    timestamp: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            text: row.try_get("text")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        Ok(ChatMessage {
            id: self.id,
            username: self.username,
            text: self.text,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width format so that `ORDER BY timestamp` is chronological.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn rows_to_messages(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatMessage>, RepositoryError> {
    let mut msgs = Vec::with_capacity(rows.len());
    for row in rows {
        let r = MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        msgs.push(r.into_message()?);
    }
    Ok(msgs)
}

// ---------------------------------------------------------------------------
// MessageStore impl
// ---------------------------------------------------------------------------

impl MessageStore for SqliteMessageStore {
    async fn append(&self, msg: &NewMessage) -> Result<ChatMessage, RepositoryError> {
        let result = sqlx::query("INSERT INTO messages (username, text, timestamp) VALUES (?, ?, ?)")
            .bind(&msg.username)
            .bind(&msg.text)
            .bind(format_datetime(&msg.timestamp))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(msg.clone().into_message(result.last_insert_rowid()))
    }

    async fn list_ordered(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, username, text, timestamp FROM messages ORDER BY timestamp ASC, id ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_messages(&rows)
    }

    async fn list_first(&self, limit: u32) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, username, text, timestamp FROM messages ORDER BY id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_messages(&rows)
    }

    async fn get(&self, id: i64) -> Result<Option<ChatMessage>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, text, timestamp FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r =
                    MessageRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
