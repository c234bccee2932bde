//! Model artifact manifest
//!
//! A manifest names one schema file and one or more estimator artifacts,
//! optionally pinned by SHA-256. Relative paths resolve against the
//! manifest's own directory.

use crate::error::{EngineError, Result};
use crate::estimator::{Estimator, EstimatorSet, LinearEstimator, OnnxEstimator};
use crate::features::FeatureSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serialization format of an estimator artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Linear,
    Onnx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorEntry {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub format: ArtifactFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub schema: PathBuf,
    pub estimators: Vec<EstimatorEntry>,
    /// Force a named set even when only one estimator is listed
    #[serde(default)]
    pub ensemble: bool,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_version() -> String {
    "unversioned".to_string()
}

impl ModelManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::model_load(path, e))?;
        let mut manifest: Self =
            serde_json::from_str(&content).map_err(|e| EngineError::model_load(path, e))?;
        if manifest.estimators.is_empty() {
            return Err(EngineError::model_load(path, "manifest lists no estimators"));
        }
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Manifest for one linear estimator
    pub fn single(schema: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            schema: schema.into(),
            estimators: vec![EstimatorEntry {
                name: "prediction".to_string(),
                path: model.into(),
                format: ArtifactFormat::Linear,
                sha256: None,
            }],
            ensemble: false,
            version: default_version(),
            base_dir: PathBuf::new(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn load_schema(&self) -> Result<FeatureSchema> {
        FeatureSchema::load(self.resolve(&self.schema))
    }

    /// Load every listed estimator, verifying checksums where pinned
    pub fn load_estimators(&self, n_features: usize) -> Result<EstimatorSet> {
        let mut members: Vec<(String, Box<dyn Estimator>)> = Vec::with_capacity(self.estimators.len());
        for entry in &self.estimators {
            let path = self.resolve(&entry.path);
            let bytes = std::fs::read(&path).map_err(|e| EngineError::model_load(&path, e))?;

            if let Some(expected) = &entry.sha256 {
                verify_checksum(&path, &bytes, expected)?;
            }

            let estimator: Box<dyn Estimator> = match entry.format {
                ArtifactFormat::Linear => Box::new(
                    LinearEstimator::from_slice(&bytes)
                        .map_err(|reason| EngineError::model_load(&path, reason))?,
                ),
                ArtifactFormat::Onnx => Box::new(
                    OnnxEstimator::from_bytes(&bytes, n_features)
                        .map_err(|e| EngineError::model_load(&path, format!("{:#}", e)))?,
                ),
            };
            debug!(name = %entry.name, path = ?path, kind = estimator.kind(), "Loaded estimator");
            members.push((entry.name.clone(), estimator));
        }

        if members.len() == 1 && !self.ensemble {
            let (_, estimator) = members.remove(0);
            return Ok(EstimatorSet::Single(estimator));
        }

        EstimatorSet::named(members).map_err(|reason| EngineError::model_load(&self.base_dir, reason))
    }
}

/// Hex-encoded SHA-256 of `data`
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn verify_checksum(path: &Path, bytes: &[u8], expected: &str) -> Result<()> {
    let computed = compute_checksum(bytes);
    if !computed.eq_ignore_ascii_case(expected) {
        return Err(EngineError::model_load(
            path,
            format!("Checksum mismatch: expected {}, got {}", expected, computed),
        ));
    }
    info!(path = ?path, checksum = %computed, "Model checksum validated");
    Ok(())
}
