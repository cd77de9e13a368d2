//! Health check handler

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

#[derive(Serialize)]
pub struct IndexResponse {
    message: &'static str,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "CardioCare API is running",
    })
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
