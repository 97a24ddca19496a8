//! Chat hub and per-connection session state machine.
//!
//! - `hub` -- `ChatHub`, the process-wide state every connection shares
//! - `session` -- `ChatSession`, driving one connection from admission to teardown

pub mod hub;
pub mod session;

pub use hub::{ChatHub, HubSettings};
pub use session::{ChatSession, SessionEnd};
