//! Binary logistic regression over the scaled vector.

use serde::{Deserialize, Serialize};

use super::{check_len, ArtifactError, Classifier, ClassifierKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<i64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.classes.len() != 2 {
            return Err(ArtifactError::Invalid(format!(
                "logistic regression needs exactly 2 classes, got {}",
                self.classes.len()
            )));
        }
        if self.coef.is_empty() {
            return Err(ArtifactError::Invalid("logistic regression has no coefficients".to_string()));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid("coefficients must be finite".to_string()));
        }
        Ok(())
    }

    pub fn decision_function(&self, x: &[f64]) -> Result<f64, ArtifactError> {
        check_len(self.coef.len(), x)?;
        Ok(self.coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::LogisticRegression
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        let z = self.decision_function(x)?;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - p, p])
    }

    /// Second class iff the decision value is positive
    fn predict(&self, x: &[f64]) -> Result<i64, ArtifactError> {
        let z = self.decision_function(x)?;
        Ok(if z > 0.0 { self.classes[1] } else { self.classes[0] })
    }
}
