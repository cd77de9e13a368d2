//! History handlers
//!
//! The store does blocking file I/O, so every call runs on the blocking pool.

use std::sync::Arc;

use axum::{extract::{Path, State}, Json};
use uuid::Uuid;

use crate::models::{DeleteHistoryResponse, HistoryEntry, HistoryStore};
use crate::{AppError, AppResult, AppState};

/// List saved predictions, newest first
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    let store = history_store(&state)?;
    let entries = tokio::task::spawn_blocking(move || store.list()).await?;
    Ok(Json(entries))
}

/// Delete one saved prediction
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteHistoryResponse>> {
    let store = history_store(&state)?;

    if !tokio::task::spawn_blocking(move || store.delete(id)).await?? {
        return Err(AppError::NotFound("History entry not found".to_string()));
    }

    tracing::debug!("History entry {} deleted", id);
    Ok(Json(DeleteHistoryResponse { deleted: true }))
}

fn history_store(state: &AppState) -> AppResult<Arc<HistoryStore>> {
    state
        .history
        .clone()
        .ok_or_else(|| AppError::NotFound("History is disabled".to_string()))
}
