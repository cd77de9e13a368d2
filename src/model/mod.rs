//! Model Module - scaler and classifier artifacts
//!
//! Both artifacts are trained offline and exported as JSON. This module only
//! consumes them: load once, validate, then answer read-only calls.
//! Nothing in here mutates after load, so the artifacts are shared across
//! request tasks without locking.

pub mod artifact;
pub mod forest;
pub mod logistic;
pub mod scaler;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use artifact::{load_classifier, load_scaler, ArtifactInfo, ClassifierArtifact};
pub use forest::{DecisionTree, RandomForest};
pub use logistic::LogisticRegression;
pub use scaler::StandardScaler;

/// Label of the class reported as "risk"
pub const POSITIVE_CLASS: i64 = 1;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("non-finite output: {0}")]
    NonFinite(String),
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Per-feature standardization fixed at training time
pub trait Scaler: Send + Sync {
    fn n_features(&self) -> usize;

    /// Names the artifact was fit on, if it recorded them
    fn feature_names(&self) -> Option<&[String]>;

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError>;
}

/// Scaled vector → class label and per-class probabilities
pub trait Classifier: Send + Sync {
    fn kind(&self) -> ClassifierKind;

    fn n_features(&self) -> usize;

    fn feature_names(&self) -> Option<&[String]>;

    /// Class labels in probability-column order
    fn classes(&self) -> &[i64];

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError>;

    /// Class with the highest probability; the first one wins a tie
    fn predict(&self, x: &[f64]) -> Result<i64, ArtifactError> {
        let proba = self.predict_proba(x)?;
        let best = argmax(&proba)
            .ok_or_else(|| ArtifactError::Invalid("empty probability vector".to_string()))?;
        self.classes()
            .get(best)
            .copied()
            .ok_or_else(|| ArtifactError::Invalid(format!("no class at index {best}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    RandomForest,
    LogisticRegression,
}

pub(crate) fn check_len(expected: usize, x: &[f64]) -> Result<(), ArtifactError> {
    if x.len() != expected {
        return Err(ArtifactError::DimensionMismatch {
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
