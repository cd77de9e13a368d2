//! CardioCare API
//!
//! Heart attack risk scoring over a pre-trained scaler + classifier pair.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       CARDIOCARE API                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /api/predict                                           │
//! │      │                                                       │
//! │      ▼                                                       │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │ Boundary │──▶│ Feature  │──▶│  Scaler  │──▶│Classifier │  │
//! │  │ checks   │   │ Encoder  │   │ (JSON)   │   │ (JSON)    │  │
//! │  └──────────┘   └──────────┘   └──────────┘   └─────┬─────┘  │
//! │                                                     ▼        │
//! │                                  PredictionResult ──▶ History│
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod model;
pub mod models;
pub mod prediction;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

use models::HistoryStore;
use prediction::PredictionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub history: Option<Arc<HistoryStore>>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(service: PredictionService, config: config::Config) -> Self {
        let history = config
            .history_path
            .clone()
            .map(|path| Arc::new(HistoryStore::new(path)));

        Self {
            service: Arc::new(service),
            history,
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/predict", post(handlers::predict::predict))
        .route("/api/model", get(handlers::model::status))
        .route("/api/history", get(handlers::history::list))
        .route("/api/history/:id", delete(handlers::history::delete));

    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
