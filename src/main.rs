//! CardioCare API server
//!
//! Loads the scaler and classifier once, then serves predictions until
//! shut down. A failed artifact load aborts startup.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardiocare_api::config::Config;
use cardiocare_api::prediction::PredictionService;
use cardiocare_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cardiocare_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" || config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("CardioCare API starting ({})...", config.environment);
    tracing::info!(
        "Loading artifacts: model={}, scaler={}",
        config.model_path.display(),
        config.scaler_path.display()
    );

    let service = PredictionService::load(
        &config.scaler_path,
        &config.model_path,
        config.encoder_policy(),
    )
    .map_err(|e| {
        tracing::error!("Error loading model: {}", e);
        e
    })
    .context("failed to load model artifacts")?;

    let status = service.status();
    tracing::info!(
        "Model and scaler loaded successfully ({:?}, layout v{} hash {}, {:?} encoding)",
        status.classifier_kind,
        status.layout.version,
        status.layout.hash,
        status.encoder_policy
    );
    if !config.strict_features {
        tracing::warn!("Lenient feature encoding: unknown fields are ignored, missing ones default to 0");
    }
    if let Some(path) = &config.history_path {
        tracing::info!("Prediction history: {}", path.display());
    }

    // Build router
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid HOST/PORT")?;
    let app = create_router(AppState::new(service, config));

    // Start server
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
