//! ONNX inference using tract
//!
//! Runs an exported regression graph (for example a scikit-learn model
//! converted with skl2onnx) taking a `[1, n_features]` f32 input and
//! producing a single scalar.

use super::{ensure_finite, ensure_width, Estimator};
use crate::error::{EngineError, Result};
use crate::features::FeatureVector;
use anyhow::Context;
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct OnnxEstimator {
    model: TractModel,
    n_features: usize,
}

impl OnnxEstimator {
    /// Load an ONNX model expecting `n_features` inputs
    pub fn load(path: impl AsRef<Path>, n_features: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| EngineError::model_load(path, e))?;
        Self::from_bytes(&bytes, n_features).map_err(|e| EngineError::model_load(path, format!("{:#}", e)))
    }

    /// Parse and optimize an ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8], n_features: usize) -> anyhow::Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { model, n_features })
    }

    fn features_to_tensor(&self, features: &FeatureVector) -> Result<Tensor> {
        let data: Vec<f32> = features.values().iter().map(|v| *v as f32).collect();
        tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map(Into::into)
            .map_err(|e| EngineError::inference(e.to_string()))
    }
}

impl Estimator for OnnxEstimator {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        ensure_width(self.n_features, features)?;
        let start = Instant::now();

        let input = self.features_to_tensor(features)?;
        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| EngineError::inference(format!("{:#}", e)))?;
        let output = result
            .first()
            .ok_or_else(|| EngineError::inference("No output from model"))?;
        let value = output
            .to_array_view::<f32>()
            .map_err(|e| EngineError::inference(e.to_string()))?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| EngineError::inference("Model produced an empty output tensor"))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        ensure_finite(value as f64)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_onnx_bytes() {
        assert!(OnnxEstimator::from_bytes(b"definitely not protobuf", 4).is_err());
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let err = OnnxEstimator::load("/nonexistent/model.onnx", 4).err().unwrap();
        assert!(matches!(err, EngineError::ModelLoad { .. }));
    }
}
