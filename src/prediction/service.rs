//! Prediction Service - encode → scale → classify → result
//!
//! Built once at startup from the two artifacts and handed to the HTTP
//! layer behind an `Arc`. Construction checks the artifacts against the
//! feature layout so a mismatched export fails the boot instead of every
//! request.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::features::layout::{first_layout_mismatch, feature_name};
use crate::features::{EncoderPolicy, FeatureEncoder, InputRecord, LayoutInfo, FEATURE_COUNT};
use crate::model::{
    load_classifier, load_scaler, ArtifactError, ArtifactInfo, Classifier, ClassifierKind, Scaler,
    POSITIVE_CLASS,
};

use super::types::{PredictError, PredictionResult};

// ============================================================================
// STATUS
// ============================================================================

/// Snapshot for the model info route
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub classifier_kind: ClassifierKind,
    pub encoder_policy: EncoderPolicy,
    pub layout: LayoutInfo,
    pub scaler: Option<ArtifactInfo>,
    pub classifier: Option<ArtifactInfo>,
    pub loaded_at: DateTime<Utc>,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

/// Latency stats. Observability only, never read by `predict`.
#[derive(Debug, Default)]
struct InferenceStats {
    count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl InferenceStats {
    fn record(&self, elapsed: Duration) {
        self.latency_sum_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> (u64, f64) {
        let count = self.count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg_ms = if count > 0 {
            (sum as f64 / count as f64) / 1000.0
        } else {
            0.0
        };
        (count, avg_ms)
    }
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct PredictionService {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
    encoder: FeatureEncoder,
    /// Column of `predict_proba` holding the positive class
    positive_index: usize,
    scaler_info: Option<ArtifactInfo>,
    classifier_info: Option<ArtifactInfo>,
    loaded_at: DateTime<Utc>,
    stats: InferenceStats,
}

impl PredictionService {
    /// Load both artifacts from disk. Any failure is `ModelUnavailable`.
    pub fn load(
        scaler_path: &Path,
        model_path: &Path,
        policy: EncoderPolicy,
    ) -> Result<Self, PredictError> {
        let (scaler, scaler_info) = load_scaler(scaler_path).map_err(unavailable)?;
        let (classifier, classifier_info) = load_classifier(model_path).map_err(unavailable)?;

        let mut service = Self::new(Box::new(scaler), classifier, policy)?;
        service.scaler_info = Some(scaler_info);
        service.classifier_info = Some(classifier_info);

        Ok(service)
    }

    /// Wrap already-built artifacts after checking them against the layout
    pub fn new(
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
        policy: EncoderPolicy,
    ) -> Result<Self, PredictError> {
        check_dimension("scaler", scaler.n_features())?;
        check_dimension("classifier", classifier.n_features())?;
        check_names("scaler", scaler.feature_names())?;
        check_names("classifier", classifier.feature_names())?;

        let classes = classifier.classes();
        let binary = classes.len() == 2 && classes.contains(&0) && classes.contains(&POSITIVE_CLASS);
        if !binary {
            return Err(PredictError::ModelUnavailable(format!(
                "classifier must be binary over classes [0, 1], got {classes:?}"
            )));
        }
        let positive_index = classes
            .iter()
            .position(|&c| c == POSITIVE_CLASS)
            .ok_or_else(|| PredictError::ModelUnavailable("no positive class".to_string()))?;

        Ok(Self {
            scaler,
            classifier,
            encoder: FeatureEncoder::new(policy),
            positive_index,
            scaler_info: None,
            classifier_info: None,
            loaded_at: Utc::now(),
            stats: InferenceStats::default(),
        })
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Score one record. Deterministic for fixed artifacts.
    pub fn predict(&self, record: &InputRecord) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();

        let vector = self.encoder.encode(record)?;
        tracing::debug!(features = %vector.to_log_entry(), "Encoded feature vector");

        let scaled = self.scaler.transform(vector.as_slice()).map_err(inference)?;
        let label = self.classifier.predict(&scaled).map_err(inference)?;
        let proba = self.classifier.predict_proba(&scaled).map_err(inference)?;

        let probability = proba.get(self.positive_index).copied().ok_or_else(|| {
            PredictError::Inference(format!(
                "expected {} class probabilities, got {}",
                self.classifier.classes().len(),
                proba.len()
            ))
        })?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::Inference(format!(
                "probability {probability} outside [0, 1]"
            )));
        }

        let positive = match label {
            POSITIVE_CLASS => true,
            0 => false,
            other => {
                return Err(PredictError::Inference(format!("unexpected class label {other}")));
            }
        };

        self.stats.record(start.elapsed());
        tracing::debug!("Raw prediction: {}, probability: {:.4}", label, probability);

        Ok(PredictionResult::new(positive, probability))
    }

    pub fn status(&self) -> ModelStatus {
        let (inference_count, avg_latency_ms) = self.stats.snapshot();

        ModelStatus {
            model_loaded: true,
            classifier_kind: self.classifier.kind(),
            encoder_policy: self.encoder.policy(),
            layout: LayoutInfo::current(),
            scaler: self.scaler_info.clone(),
            classifier: self.classifier_info.clone(),
            loaded_at: self.loaded_at,
            inference_count,
            avg_latency_ms,
        }
    }
}

fn check_dimension(artifact: &str, n_features: usize) -> Result<(), PredictError> {
    if n_features != FEATURE_COUNT {
        return Err(PredictError::ModelUnavailable(format!(
            "{artifact} expects {n_features} features, layout has {FEATURE_COUNT}"
        )));
    }
    Ok(())
}

fn check_names(artifact: &str, names: Option<&[String]>) -> Result<(), PredictError> {
    let Some(names) = names else {
        return Ok(());
    };

    match first_layout_mismatch(names) {
        None => Ok(()),
        Some(i) => Err(PredictError::ModelUnavailable(format!(
            "{artifact} feature {i} is {:?}, layout expects {:?}",
            names.get(i).map(String::as_str),
            feature_name(i)
        ))),
    }
}

fn unavailable(err: ArtifactError) -> PredictError {
    PredictError::ModelUnavailable(err.to_string())
}

fn inference(err: ArtifactError) -> PredictError {
    PredictError::Inference(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::layout::feature_names;
    use crate::features::InputError;
    use crate::model::scaler::ScalerParams;
    use crate::model::{LogisticRegression, StandardScaler};
    use crate::prediction::RiskLevel;

    fn identity_scaler(n: usize) -> Box<dyn Scaler> {
        Box::new(
            StandardScaler::from_params(ScalerParams {
                feature_names: None,
                mean: vec![0.0; n],
                scale: vec![1.0; n],
            })
            .unwrap(),
        )
    }

    /// Positive iff age > 50
    fn age_model(n: usize) -> LogisticRegression {
        let mut coef = vec![0.0; n];
        coef[0] = 1.0;
        LogisticRegression {
            classes: vec![0, 1],
            coef,
            intercept: -50.0,
            feature_names: None,
        }
    }

    fn service(policy: EncoderPolicy) -> PredictionService {
        PredictionService::new(
            identity_scaler(FEATURE_COUNT),
            Box::new(age_model(FEATURE_COUNT)),
            policy,
        )
        .unwrap()
    }

    fn record(pairs: &[(&str, f64)]) -> InputRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_high_and_low_risk() {
        let svc = service(EncoderPolicy::Lenient);

        let high = svc.predict(&record(&[("age", 52.0), ("gender_Male", 1.0)])).unwrap();
        assert_eq!(high.prediction, 1);
        assert_eq!(high.risk_level, RiskLevel::High);
        assert!((high.probability - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-12);

        let low = svc.predict(&record(&[("age", 30.0), ("gender_Male", 1.0)])).unwrap();
        assert_eq!(low.prediction, 0);
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert!(low.probability < 0.5);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let svc = service(EncoderPolicy::Lenient);
        let input = record(&[("age", 58.0), ("gender_Male", 0.0), ("diabetes", 1.0)]);
        assert_eq!(svc.predict(&input).unwrap(), svc.predict(&input).unwrap());
    }

    #[test]
    fn test_strict_policy_surfaces_validation_error() {
        let svc = service(EncoderPolicy::Strict);
        let err = svc.predict(&record(&[("age", 58.0), ("gender_Male", 0.0)])).unwrap_err();
        assert!(matches!(err, PredictError::Validation(InputError::MissingFields(_))));
    }

    #[test]
    fn test_rejects_wrong_dimension() {
        let err = PredictionService::new(
            identity_scaler(20),
            Box::new(age_model(FEATURE_COUNT)),
            EncoderPolicy::Lenient,
        )
        .err()
        .unwrap();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));

        let err = PredictionService::new(
            identity_scaler(FEATURE_COUNT),
            Box::new(age_model(22)),
            EncoderPolicy::Lenient,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("classifier expects 22 features"));
    }

    #[test]
    fn test_rejects_reordered_feature_names() {
        let mut names: Vec<String> = feature_names().map(str::to_string).collect();
        names.swap(17, 18);
        let mut model = age_model(FEATURE_COUNT);
        model.feature_names = Some(names);

        let err = PredictionService::new(
            identity_scaler(FEATURE_COUNT),
            Box::new(model),
            EncoderPolicy::Lenient,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("feature 17"));
    }

    #[test]
    fn test_rejects_non_binary_classes() {
        let mut model = age_model(FEATURE_COUNT);
        model.classes = vec![1, 2];
        let err = PredictionService::new(
            identity_scaler(FEATURE_COUNT),
            Box::new(model),
            EncoderPolicy::Lenient,
        )
        .err()
        .unwrap();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));
    }

    #[test]
    fn test_reversed_class_order() {
        let mut model = age_model(FEATURE_COUNT);
        model.classes = vec![1, 0];
        let svc = PredictionService::new(
            identity_scaler(FEATURE_COUNT),
            Box::new(model),
            EncoderPolicy::Lenient,
        )
        .unwrap();

        // Decision > 0 now selects class 0, and column 0 holds class 1.
        let result = svc.predict(&record(&[("age", 60.0), ("gender_Male", 1.0)])).unwrap();
        assert_eq!(result.prediction, 0);
        assert!(result.probability < 0.5);
    }

    #[test]
    fn test_inference_failure_is_wrapped() {
        struct Broken;
        impl Scaler for Broken {
            fn n_features(&self) -> usize {
                FEATURE_COUNT
            }
            fn feature_names(&self) -> Option<&[String]> {
                None
            }
            fn transform(&self, _x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
                Ok(vec![0.0; 3])
            }
        }

        let svc = PredictionService::new(
            Box::new(Broken),
            Box::new(age_model(FEATURE_COUNT)),
            EncoderPolicy::Lenient,
        )
        .unwrap();

        let err = svc.predict(&record(&[("age", 60.0), ("gender_Male", 1.0)])).unwrap_err();
        match err {
            PredictError::Inference(details) => assert!(details.contains("dimension mismatch")),
            other => panic!("expected inference error, got {other:?}"),
        }
    }

    #[test]
    fn test_status_counts_inferences() {
        let svc = service(EncoderPolicy::Lenient);
        assert_eq!(svc.status().inference_count, 0);

        svc.predict(&record(&[("age", 40.0), ("gender_Male", 1.0)])).unwrap();
        svc.predict(&record(&[("age", 70.0), ("gender_Male", 0.0)])).unwrap();

        let status = svc.status();
        assert_eq!(status.inference_count, 2);
        assert_eq!(status.classifier_kind, ClassifierKind::LogisticRegression);
        assert!(status.scaler.is_none());
    }
}
