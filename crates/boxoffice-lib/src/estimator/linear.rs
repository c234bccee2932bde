//! Linear estimators (ordinary least squares and linear quantile regression)
//!
//! Artifacts are JSON `{ "coefficients": [...], "intercept": ... }` with one
//! coefficient per schema column. Floats round-trip bit-exactly.

use super::{ensure_finite, ensure_width, Estimator};
use crate::error::{EngineError, Result};
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEstimator {
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl LinearEstimator {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| EngineError::model_load(path, e))?;
        Self::from_slice(&content).map_err(|reason| EngineError::model_load(path, reason))
    }

    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, String> {
        let model: Self = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        if model.coefficients.is_empty() {
            return Err("linear model has no coefficients".to_string());
        }
        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear model has non-finite parameters".to_string());
        }
        Ok(model)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Estimator for LinearEstimator {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        ensure_width(self.coefficients.len(), features)?;
        let value = self
            .coefficients
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (c, x)| acc + c * x);
        ensure_finite(value)
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}
