//! Prediction result and error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::InputError;

pub const RISK_MESSAGE: &str = "Heart attack risk detected";
pub const NO_RISK_MESSAGE: &str = "No heart attack risk detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Low,
}

/// Outcome of one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 1 = risk, 0 = no risk
    pub prediction: u8,
    /// Probability of the positive class
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub message: String,
}

impl PredictionResult {
    pub fn new(positive: bool, probability: f64) -> Self {
        if positive {
            Self {
                prediction: 1,
                probability,
                risk_level: RiskLevel::High,
                message: RISK_MESSAGE.to_string(),
            }
        } else {
            Self {
                prediction: 0,
                probability,
                risk_level: RiskLevel::Low,
                message: NO_RISK_MESSAGE.to_string(),
            }
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}

#[derive(Debug, Error)]
pub enum PredictError {
    /// Caller sent something unusable; nothing was computed
    #[error(transparent)]
    Validation(#[from] InputError),

    /// Artifacts missing, unreadable or incompatible with the feature layout
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Scaling or classification failed
    #[error("inference failed: {0}")]
    Inference(String),
}
