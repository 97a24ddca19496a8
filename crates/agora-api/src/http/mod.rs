//! HTTP/WebSocket layer for Agora.
//!
//! Axum router with the chat WebSocket endpoint, a username check, health
//! and database status, and optional static file serving.

pub mod error;
pub mod handlers;
pub mod router;
