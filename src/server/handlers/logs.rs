//! Diagnostic log handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use crate::logbook::LogEntry;

/// GET /api/logs - Recent entries, oldest first.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(state.log.read().await.entries())
}

/// DELETE /api/logs
pub async fn clear(State(state): State<Arc<AppState>>) -> StatusCode {
    state.log.write().await.clear();
    StatusCode::NO_CONTENT
}
