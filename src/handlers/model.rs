//! Model info handler

use axum::{extract::State, Json};

use crate::prediction::ModelStatus;
use crate::AppState;

/// Loaded artifacts, feature layout and inference stats
pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.service.status())
}
