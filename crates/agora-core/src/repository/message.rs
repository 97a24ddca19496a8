//! Message store trait definition.
//!
//! Defines the storage interface for persisted chat messages. The
//! infrastructure layer (agora-infra) implements this trait with SQLite
//! persistence.

use agora_types::error::RepositoryError;
use agora_types::message::{ChatMessage, NewMessage};

/// Durable, ordered log of chat messages.
///
/// Implementations must be safe for concurrent append/delete/list from many
/// sessions at once.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageStore: Send + Sync {
    /// Persist a message and return it with its store-assigned id.
    fn append(
        &self,
        msg: &NewMessage,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// All stored messages, ascending by timestamp then id.
    fn list_ordered(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// The first `limit` messages in insertion (id) order.
    fn list_first(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Look up a single message.
    fn get(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ChatMessage>, RepositoryError>> + Send;

    /// Delete a message. Returns `true` if a row was removed, `false` if it
    /// was already absent. Concurrent deletes of one id see exactly one `true`.
    fn delete_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Number of stored messages.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
