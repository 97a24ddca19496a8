//! Shared domain types for Agora.
//!
//! This crate contains the types used across the chat service: persisted
//! messages, wire envelopes, session identity, server configuration, and
//! the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod envelope;
pub mod error;
pub mod message;
pub mod session;
