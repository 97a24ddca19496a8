//! Chat core and repository trait definitions for Agora.
//!
//! This crate owns the session registry, the broadcaster, and the chat
//! session state machine, and defines the `MessageStore` port that the
//! infrastructure layer implements. It depends only on `agora-types` --
//! never on `agora-infra` or any database/IO crate.

pub mod chat;
pub mod repository;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
