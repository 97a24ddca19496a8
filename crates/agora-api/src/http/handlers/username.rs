//! Username availability check.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub available: bool,
}

/// GET /check_username/{username}
///
/// Advisory only: the name is not reserved, so a later connection can
/// still be refused if another client claims it first.
pub async fn check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Json<UsernameAvailability> {
    let available = state.hub.is_username_available(&username);
    tracing::debug!(%username, available, "username availability checked");
    Json(UsernameAvailability { available })
}
