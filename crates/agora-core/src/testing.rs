//! In-memory `MessageStore` test double.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use agora_types::error::RepositoryError;
use agora_types::message::{ChatMessage, NewMessage};

use crate::repository::MessageStore;

#[derive(Default)]
struct Inner {
    messages: Vec<ChatMessage>,
    last_id: i64,
}

/// Vec-backed store. `set_failing(true)` makes every call return an error.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.inner.lock().unwrap().messages.clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

impl MessageStore for MemoryStore {
    async fn append(&self, msg: &NewMessage) -> Result<ChatMessage, RepositoryError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        inner.last_id += 1;
        let stored = msg.clone().into_message(inner.last_id);
        inner.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_ordered(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.check()?;
        let mut messages = self.snapshot();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn list_first(&self, limit: u32) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.check()?;
        let mut messages = self.snapshot();
        messages.sort_by_key(|m| m.id);
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn get(&self, id: i64) -> Result<Option<ChatMessage>, RepositoryError> {
        self.check()?;
        Ok(self.snapshot().into_iter().find(|m| m.id == id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.messages.len();
        inner.messages.retain(|m| m.id != id);
        Ok(inner.messages.len() < before)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().messages.len() as u64)
    }
}
