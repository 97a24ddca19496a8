//! Axum router configuration with middleware.
//!
//! Routes:
//! - `/ws/{username}/{client_id}` -- chat WebSocket
//! - `/check_username/{username}` -- advisory name availability
//! - `/health` -- liveness and connected users
//! - `/db_status` (alias `/test_db`) -- message count and a sample
//!
//! Middleware: CORS (allow any), HTTP tracing.
//!
//! When a static directory is configured, its files are served under
//! `/static` and its `index.html` at `/`. If the directory does not exist,
//! only the API is served.

use std::path::Path;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/ws/{username}/{client_id}", get(handlers::ws::ws_handler))
        .route(
            "/check_username/{username}",
            get(handlers::username::check_username),
        )
        .route("/health", get(handlers::status::health_check))
        .route("/db_status", get(handlers::status::db_status))
        .route("/test_db", get(handlers::status::db_status));

    match static_dir {
        Some(dir) if dir.is_dir() => {
            router = router
                .nest_service("/static", ServeDir::new(dir))
                .route_service("/", ServeFile::new(dir.join("index.html")));
            tracing::info!(path = %dir.display(), "static file serving enabled");
        }
        Some(dir) => {
            tracing::warn!(path = %dir.display(), "static directory not found, serving API only");
        }
        None => {}
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
    use tower::ServiceExt;

    use agora_core::repository::MessageStore;
    use agora_core::session::outbound_channel;
    use agora_types::config::ServerConfig;
    use agora_types::message::NewMessage;
    use agora_types::session::{SessionId, SessionInfo};

    type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn test_state(tmp: &TempDir) -> AppState {
        AppState::with_config(tmp.path().to_path_buf(), ServerConfig::default())
            .await
            .unwrap()
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn spawn_server(state: AppState) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(state, None);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn connect(addr: std::net::SocketAddr, username: &str, client_id: &str) -> WsClient {
        let url = format!("ws://{addr}/ws/{username}/{client_id}");
        let (ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
        ws
    }

    async fn next_json(ws: &mut WsClient) -> Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("websocket error");
            if let WsMessage::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn health_reports_active_sessions() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        let (status, body) = get_json(build_router(state, None), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_sessions"], 0);
        assert_eq!(body["users"], json!([]));
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn health_lists_connected_users() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        let info = SessionInfo {
            id: SessionId::new(),
            username: "alice".to_string(),
            client_id: "c1".to_string(),
        };
        state.hub.registry().reserve(info, outbound_channel().0).unwrap();

        let (_, body) = get_json(build_router(state, None), "/health").await;
        assert_eq!(body["active_sessions"], 1);
        assert_eq!(body["users"], json!(["alice"]));
    }

    #[tokio::test]
    async fn check_username_reflects_registry() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;

        let (status, body) = get_json(build_router(state.clone(), None), "/check_username/alice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"available": true}));

        let (tx, _rx) = outbound_channel();
        let info = SessionInfo {
            id: SessionId::new(),
            username: "alice".to_string(),
            client_id: "c1".to_string(),
        };
        state.hub.registry().reserve(info, tx).unwrap();

        let (_, body) = get_json(build_router(state.clone(), None), "/check_username/alice").await;
        assert_eq!(body, json!({"available": false}));

        let (_, body) = get_json(build_router(state, None), "/check_username/Alice").await;
        assert_eq!(body, json!({"available": true}));
    }

    #[tokio::test]
    async fn db_status_counts_and_samples_messages() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;

        let (status, body) = get_json(build_router(state.clone(), None), "/db_status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message_count"], 0);
        assert_eq!(body["sample_messages"], json!([]));

        for (user, text) in [("alice", "one"), ("bob", "two"), ("carol", "three"), ("dave", "four")] {
            state
                .store()
                .append(&NewMessage::new(user, text).unwrap())
                .await
                .unwrap();
        }

        let (_, body) = get_json(build_router(state, None), "/db_status").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message_count"], 4);
        let samples = body["sample_messages"].as_array().unwrap();
        let users: Vec<&str> = samples.iter().map(|s| s["user"].as_str().unwrap()).collect();
        assert_eq!(users, ["alice", "bob", "carol"]);
        let ids: Vec<i64> = samples.iter().map(|s| s["id"].as_i64().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_db_is_an_alias_for_db_status() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        for (user, text) in [("alice", "one"), ("bob", "two")] {
            state
                .store()
                .append(&NewMessage::new(user, text).unwrap())
                .await
                .unwrap();
        }

        let (status, legacy) = get_json(build_router(state.clone(), None), "/test_db").await;
        let (_, current) = get_json(build_router(state, None), "/db_status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(legacy, current);
        assert_eq!(legacy["message_count"], 2);
    }

    #[tokio::test]
    async fn static_dir_serves_index() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        let web = TempDir::new().unwrap();
        std::fs::write(web.path().join("index.html"), "<h1>agora</h1>").unwrap();
        std::fs::write(web.path().join("app.js"), "console.log(1)").unwrap();

        let router = build_router(state, Some(web.path()));
        let response = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>agora</h1>");

        let response = router
            .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn websocket_chat_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        let addr = spawn_server(state.clone()).await;

        let mut alice = connect(addr, "alice", "c1").await;
        let joined = next_json(&mut alice).await;
        assert_eq!(joined["type"], "system");
        assert_eq!(joined["text"], "alice joined the chat");

        alice
            .send(WsMessage::text(json!({"text": "hello"}).to_string()))
            .await
            .unwrap();
        let echoed = next_json(&mut alice).await;
        assert_eq!(echoed["type"], "message");
        assert_eq!(echoed["username"], "alice");
        assert_eq!(echoed["text"], "hello");
        let message_id = echoed["id"].as_i64().unwrap();

        // A later joiner sees the history first, then its own join notice.
        let mut bob = connect(addr, "bob", "c2").await;
        let replayed = next_json(&mut bob).await;
        assert_eq!(replayed["type"], "message");
        assert_eq!(replayed["id"], message_id);
        assert_eq!(next_json(&mut bob).await["text"], "bob joined the chat");
        assert_eq!(next_json(&mut alice).await["text"], "bob joined the chat");

        alice
            .send(WsMessage::text(
                json!({"type": "delete", "message_id": message_id}).to_string(),
            ))
            .await
            .unwrap();
        let expected = json!({"type": "delete", "message_id": message_id});
        assert_eq!(next_json(&mut alice).await, expected);
        assert_eq!(next_json(&mut bob).await, expected);
        assert_eq!(state.store().count().await.unwrap(), 0);

        bob.close(None).await.unwrap();
        assert_eq!(next_json(&mut alice).await["text"], "bob left the chat");
    }

    #[tokio::test]
    async fn websocket_duplicate_name_is_refused() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        let addr = spawn_server(state.clone()).await;

        let mut first = connect(addr, "alice", "c1").await;
        assert_eq!(next_json(&mut first).await["text"], "alice joined the chat");

        let mut second = connect(addr, "alice", "c2").await;
        let notice = next_json(&mut second).await;
        assert_eq!(notice["type"], "system");
        assert_eq!(
            notice["text"],
            "Username 'alice' is already taken. Please choose another name."
        );

        // The refused connection is closed by the server.
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match second.next().await {
                    Some(Ok(WsMessage::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        })
        .await;
        assert!(closed.is_ok());
        assert_eq!(state.hub.registry().len(), 1);
    }

    #[tokio::test]
    async fn websocket_rejects_overlong_username() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp).await;
        let addr = spawn_server(state).await;

        let long = "a".repeat(51);
        let url = format!("ws://{addr}/ws/{long}/c1");
        match tokio_tungstenite::connect_async(url).await {
            Err(tungstenite::Error::Http(response)) => {
                assert_eq!(response.status().as_u16(), 400);
            }
            Err(err) => panic!("expected HTTP 400, got {err}"),
            Ok(_) => panic!("upgrade should have been refused"),
        }
    }
}
