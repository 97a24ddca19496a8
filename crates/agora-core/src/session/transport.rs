//! Transport ports between a chat session and its connection.
//!
//! Inbound frames arrive through a [`FrameSource`]. Outbound frames never
//! touch the connection directly: every writer (the session itself and
//! other sessions' broadcasts) pushes [`Outbound`] items into the
//! session's queue, and a single writer task drains that queue into the
//! socket.
//!
//! The queue is unbounded, so pushing never waits and never drops a frame
//! for a session that is merely behind. It only fails once the writer has
//! gone away. Bounding a stalled peer is the writer's job: it stops after a
//! write times out, which closes the queue.

use std::sync::Arc;

use agora_types::error::TransportError;
use tokio::sync::mpsc;

/// An item in a session's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A serialized envelope, shared across all recipients of a fan-out.
    Text(Arc<str>),
    /// Close the connection after flushing earlier frames.
    Close,
}

/// Source of inbound text frames for one connection.
pub trait FrameSource: Send {
    /// Wait for the next text frame.
    ///
    /// `Ok(None)` means the peer disconnected or closed the connection.
    fn recv(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Option<String>, TransportError>> + Send;
}

/// Channel-backed frame source. Dropping every sender reads as a disconnect.
impl FrameSource for mpsc::Receiver<String> {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(mpsc::Receiver::recv(self).await)
    }
}

/// Sending half of a session's outbound queue.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Receiving half of a session's outbound queue, drained by the writer.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Create the outbound queue for one session.
pub fn outbound_channel() -> (OutboundSender, OutboundReceiver) {
    mpsc::unbounded_channel()
}
