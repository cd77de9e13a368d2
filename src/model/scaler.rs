//! Standard scaler: `(x - mean) / scale`, statistics fixed at training time.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{check_len, ArtifactError, Scaler};

/// Serialized form of the scaler artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct StandardScaler {
    feature_names: Option<Vec<String>>,
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn from_params(params: ScalerParams) -> Result<Self, ArtifactError> {
        let ScalerParams {
            feature_names,
            mean,
            scale,
        } = params;

        if mean.is_empty() {
            return Err(ArtifactError::Invalid("scaler has no features".to_string()));
        }
        if mean.len() != scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if let Some(names) = &feature_names {
            if names.len() != mean.len() {
                return Err(ArtifactError::Invalid(format!(
                    "scaler declares {} feature names for {} features",
                    names.len(),
                    mean.len()
                )));
            }
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ArtifactError::Invalid(
                "scaler statistics must be finite".to_string(),
            ));
        }

        // Constant features were fit with a zero spread; they pass through centred.
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect::<Array1<f64>>();

        Ok(Self {
            feature_names,
            mean: Array1::from(mean),
            scale,
        })
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn scale(&self) -> ArrayView1<'_, f64> {
        self.scale.view()
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_len(self.mean.len(), x)?;

        let scaled = (&ArrayView1::from(x) - &self.mean) / &self.scale;
        Ok(scaled.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mean: Vec<f64>, scale: Vec<f64>) -> ScalerParams {
        ScalerParams {
            feature_names: None,
            mean,
            scale,
        }
    }

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::from_params(params(vec![53.0, 200.0], vec![12.0, 50.0])).unwrap();
        let scaled = scaler.transform(&[65.0, 150.0]).unwrap();
        assert_eq!(scaled, vec![1.0, -1.0]);
    }

    #[test]
    fn test_zero_scale_is_treated_as_one() {
        let scaler = StandardScaler::from_params(params(vec![1.0, 0.0], vec![0.0, 2.0])).unwrap();
        assert_eq!(scaler.scale().to_vec(), vec![1.0, 2.0]);
        assert_eq!(scaler.transform(&[3.0, 4.0]).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_wrong_input_length() {
        let scaler = StandardScaler::from_params(params(vec![0.0; 3], vec![1.0; 3])).unwrap();
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ArtifactError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_rejects_inconsistent_params() {
        assert!(StandardScaler::from_params(params(vec![0.0; 3], vec![1.0; 2])).is_err());
        assert!(StandardScaler::from_params(params(vec![], vec![])).is_err());
        assert!(StandardScaler::from_params(params(vec![f64::NAN], vec![1.0])).is_err());

        let mut named = params(vec![0.0; 2], vec![1.0; 2]);
        named.feature_names = Some(vec!["age".into()]);
        assert!(StandardScaler::from_params(named).is_err());
    }
}
