//! Artifact loading
//!
//! Reads the JSON exports from disk, fingerprints them with SHA-256 and
//! turns them into validated, immutable models.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::RandomForest;
use super::logistic::LogisticRegression;
use super::scaler::{ScalerParams, StandardScaler};
use super::{ArtifactError, Classifier};

/// Where an artifact came from and what it hashed to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Classifier export, tagged by model family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ClassifierArtifact {
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ArtifactError> {
        match self {
            Self::RandomForest(forest) => {
                forest.validate()?;
                Ok(Box::new(forest))
            }
            Self::LogisticRegression(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

pub fn load_scaler(path: &Path) -> Result<(StandardScaler, ArtifactInfo), ArtifactError> {
    let (bytes, info) = read_artifact(path)?;
    let params: ScalerParams = parse(&bytes, &info)?;
    let scaler = StandardScaler::from_params(params)?;

    tracing::info!("Scaler loaded from {} ({} features)", info.path, scaler.mean().len());
    Ok((scaler, info))
}

pub fn load_classifier(path: &Path) -> Result<(Box<dyn Classifier>, ArtifactInfo), ArtifactError> {
    let (bytes, info) = read_artifact(path)?;
    let artifact: ClassifierArtifact = parse(&bytes, &info)?;
    let classifier = artifact.into_classifier()?;

    tracing::info!(
        "Classifier loaded from {} ({:?}, {} features)",
        info.path,
        classifier.kind(),
        classifier.n_features()
    );
    Ok((classifier, info))
}

fn read_artifact(path: &Path) -> Result<(Vec<u8>, ArtifactInfo), ArtifactError> {
    let display = path.display().to_string();

    if !path.exists() {
        return Err(ArtifactError::NotFound(display));
    }

    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;

    let info = ArtifactInfo {
        path: display,
        sha256: hex::encode(Sha256::digest(&bytes)),
        size_bytes: bytes.len(),
    };

    Ok((bytes, info))
}

fn parse<T: serde::de::DeserializeOwned>(bytes: &[u8], info: &ArtifactInfo) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: info.path.clone(),
        source,
    })
}
