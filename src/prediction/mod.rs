//! Prediction Module - orchestration over the loaded artifacts

pub mod service;
pub mod types;

pub use service::{ModelStatus, PredictionService};
pub use types::{PredictError, PredictionResult, RiskLevel, NO_RISK_MESSAGE, RISK_MESSAGE};
