//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::features::EncoderPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Classifier artifact
    pub model_path: PathBuf,

    /// Scaler artifact
    pub scaler_path: PathBuf,

    /// Reject unknown / missing feature fields instead of defaulting them
    pub strict_features: bool,

    /// History file; history routes are disabled when unset
    pub history_path: Option<PathBuf>,

    /// Environment (development, production)
    pub environment: String,

    /// "json" for JSON log lines, anything else for the pretty formatter
    pub log_format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/ml_model.json")),

            scaler_path: env::var("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/scaler.json")),

            strict_features: env::var("STRICT_FEATURES")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            history_path: env::var("HISTORY_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn encoder_policy(&self) -> EncoderPolicy {
        if self.strict_features {
            EncoderPolicy::Strict
        } else {
            EncoderPolicy::Lenient
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("models/ml_model.json"),
            scaler_path: PathBuf::from("models/scaler.json"),
            strict_features: false,
            history_path: None,
            environment: "development".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
