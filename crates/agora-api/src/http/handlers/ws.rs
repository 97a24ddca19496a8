//! WebSocket handler for chat sessions.
//!
//! `/ws/{username}/{client_id}` upgrades the connection and hands it to a
//! [`ChatSession`](agora_core::chat::ChatSession). The socket is split:
//!
//! - **Writer task:** drains the session's outbound queue into the sink.
//!   `Outbound::Close` sends a close frame and ends the task. A write that
//!   stalls past `write_timeout_secs` also ends it, which closes the queue
//!   so broadcasts to a dead peer stop piling up.
//! - **Reader:** [`WsFrames`] adapts the stream half into a `FrameSource`,
//!   surfacing text frames and ignoring binary and control frames.
//!
//! The session owns admission, replay, fan-out and teardown; this module
//! only moves bytes.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tracing::Instrument;

use agora_core::session::{FrameSource, Outbound, OutboundReceiver, outbound_channel};
use agora_types::error::TransportError;
use agora_types::message::validate_username;

use crate::http::error::AppError;
use crate::state::AppState;

/// Upgrade an HTTP request to a chat session.
///
/// Invalid usernames are refused with 400 before the upgrade. Whether the
/// name is free is decided by the session itself after the upgrade, so a
/// conflicting client still receives the "name taken" notice.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((username, client_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Response {
    if let Err(err) = validate_username(&username) {
        return AppError::from(err).into_response();
    }
    if client_id.trim().is_empty() {
        return AppError::Validation("client id must not be empty".to_string()).into_response();
    }

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, username, client_id))
}

async fn handle_ws_connection(socket: WebSocket, state: AppState, username: String, client_id: String) {
    let (sink, stream) = socket.split();
    let (outbound_tx, outbound_rx) = outbound_channel();
    let write_timeout = Duration::from_secs(state.config.write_timeout_secs.max(1));

    let writer = tokio::spawn(write_outbound(sink, outbound_rx, write_timeout));

    let session = state.hub.open_session(username, client_id);
    let span = tracing::info_span!(
        "chat_session",
        session_id = %session.info().id,
        username = %session.info().username,
        client_id = %session.info().client_id,
    );

    let end = session
        .run(WsFrames(stream), outbound_tx)
        .instrument(span)
        .await;
    tracing::debug!(reason = %end, "WebSocket session finished");

    // The session dropped its queue handle; the writer drains what is left
    // and exits.
    if let Err(err) = writer.await {
        tracing::warn!("WebSocket writer task failed: {err}");
    }
}

/// Forward queued frames to the client until `Close`, a send error, or a
/// stalled write.
async fn write_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: OutboundReceiver,
    write_timeout: Duration,
) {
    while let Some(item) = rx.recv().await {
        match item {
            Outbound::Text(frame) => {
                let send = sink.send(Message::Text(frame.to_string().into()));
                match tokio::time::timeout(write_timeout, send).await {
                    Ok(Ok(())) => {}
                    // Client disconnected
                    Ok(Err(_)) => break,
                    Err(_) => {
                        tracing::warn!(
                            backlog = rx.len(),
                            "WebSocket write stalled, dropping connection writer"
                        );
                        break;
                    }
                }
            }
            Outbound::Close => {
                let _ = tokio::time::timeout(write_timeout, sink.send(Message::Close(None))).await;
                break;
            }
        }
    }
    // Later pushes into this queue now fail and count as delivery failures.
    rx.close();
    let _ = tokio::time::timeout(write_timeout, sink.close()).await;
}

/// Stream half of a WebSocket, read as a sequence of text frames.
pub struct WsFrames(pub SplitStream<WebSocket>);

impl FrameSource for WsFrames {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.0.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!("ignoring binary WebSocket frame");
                }
                // Ping/pong are answered by the protocol layer
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(TransportError(err.to_string())),
            }
        }
    }
}
