//! Prediction handler

use axum::{body::Bytes, extract::State, Json};

use crate::features::{check_required, InputRecord};
use crate::prediction::PredictionResult;
use crate::{AppResult, AppState};

/// Score one record.
///
/// The body is parsed by hand so that empty or malformed JSON comes back
/// as a validation error in the same shape as every other error.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictionResult>> {
    let record = InputRecord::from_slice(&body).map_err(|e| {
        tracing::info!("Rejected prediction request: {}", e);
        e
    })?;

    if let Err(e) = check_required(&record) {
        tracing::info!("Rejected prediction request: {}", e);
        return Err(e.into());
    }

    let result = state.service.predict(&record)?;

    tracing::info!(
        "Prediction: {:?} risk (p={:.3})",
        result.risk_level,
        result.probability
    );

    if let Some(history) = state.history.clone() {
        let saved = result.clone();
        let task = tokio::task::spawn_blocking(move || history.record(&record, &saved)).await;
        if let Err(e) = task {
            tracing::warn!("History write task failed: {}", e);
        }
    }

    Ok(Json(result))
}
