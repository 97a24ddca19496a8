//! Liveness and database status endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use agora_core::repository::MessageStore;

use crate::http::error::AppError;
use crate::state::AppState;

/// Number of messages echoed by `/db_status`, oldest first.
const SAMPLE_SIZE: u32 = 3;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
    pub users: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SampleMessage {
    pub id: i64,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct DbStatusResponse {
    pub status: &'static str,
    pub message_count: u64,
    pub sample_messages: Vec<SampleMessage>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.hub.registry().len(),
        users: state.hub.registry().usernames(),
    })
}

/// GET /db_status (also `/test_db`) - message count plus the first few
/// authors.
pub async fn db_status(State(state): State<AppState>) -> Result<Json<DbStatusResponse>, AppError> {
    let store = state.store();
    let message_count = store.count().await?;

    let sample_messages = store
        .list_first(SAMPLE_SIZE)
        .await?
        .into_iter()
        .map(|m| SampleMessage {
            id: m.id,
            user: m.username,
        })
        .collect();

    Ok(Json(DbStatusResponse {
        status: "ok",
        message_count,
        sample_messages,
    }))
}
