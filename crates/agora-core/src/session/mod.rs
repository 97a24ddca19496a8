//! Live session tracking and fan-out.
//!
//! - `registry` -- `SessionRegistry` with the unique-name index
//! - `broadcast` -- `Broadcaster` delivering envelopes to every session
//! - `transport` -- `FrameSource` and `Outbound` connection ports

pub mod broadcast;
pub mod registry;
pub mod transport;

pub use broadcast::{BroadcastReport, Broadcaster};
pub use registry::SessionRegistry;
pub use transport::{FrameSource, Outbound, OutboundReceiver, OutboundSender, outbound_channel};
