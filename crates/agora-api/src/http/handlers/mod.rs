//! HTTP and WebSocket request handlers.

pub mod status;
pub mod username;
pub mod ws;
