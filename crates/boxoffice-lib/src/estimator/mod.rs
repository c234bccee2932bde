//! Trained estimators and their invocation
//!
//! A predictor owns either one estimator or an ordered, named set of them
//! (e.g. low/median/high quantile models). Every member of a set is scored
//! against the same [`FeatureVector`] so their outputs stay comparable.

mod linear;
mod onnx;

pub use linear::LinearEstimator;
pub use onnx::OnnxEstimator;

use crate::error::{EngineError, Result};
use crate::features::FeatureVector;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An immutable trained model mapping a feature vector to one scalar
pub trait Estimator: Send + Sync {
    /// Score one aligned feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Number of input features the model was trained on
    fn n_features(&self) -> usize;

    /// Short model family label for logs
    fn kind(&self) -> &'static str;
}

/// Fail with an inference error when the vector width differs from the model's
pub(crate) fn ensure_width(expected: usize, features: &FeatureVector) -> Result<()> {
    if features.len() != expected {
        return Err(EngineError::inference(format!(
            "dimension mismatch: model expects {} features, vector has {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

pub(crate) fn ensure_finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::inference(format!("non-finite model output {}", value)))
    }
}

/// Ordered collection of estimators sharing one schema
pub struct NamedEstimatorSet {
    members: Vec<(String, Box<dyn Estimator>)>,
}

impl NamedEstimatorSet {
    /// Build a set, keeping the given order; names must be unique
    pub fn new(members: Vec<(String, Box<dyn Estimator>)>) -> std::result::Result<Self, String> {
        if members.is_empty() {
            return Err("estimator set is empty".to_string());
        }
        for (i, (name, _)) in members.iter().enumerate() {
            if members[..i].iter().any(|(other, _)| other == name) {
                return Err(format!("duplicate estimator name '{}'", name));
            }
        }
        Ok(Self { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Estimator)> {
        self.members
            .iter()
            .map(|(name, estimator)| (name.as_str(), estimator.as_ref()))
    }

    /// Score every member against the same vector, aborting on the first failure
    pub fn predict_many(&self, features: &FeatureVector) -> Result<NamedPredictions> {
        let mut predictions = NamedPredictions::with_capacity(self.members.len());
        for (name, estimator) in &self.members {
            let value = estimator
                .predict(features)
                .map_err(|e| e.for_estimator(name))?;
            predictions.push(name.clone(), value);
        }
        Ok(predictions)
    }
}

/// The estimator(s) owned by a predictor
pub enum EstimatorSet {
    Single(Box<dyn Estimator>),
    Named(NamedEstimatorSet),
}

impl EstimatorSet {
    pub fn single(estimator: impl Estimator + 'static) -> Self {
        Self::Single(Box::new(estimator))
    }

    pub fn named(members: Vec<(String, Box<dyn Estimator>)>) -> std::result::Result<Self, String> {
        NamedEstimatorSet::new(members).map(Self::Named)
    }

    /// Score with the single estimator
    pub fn predict_one(&self, features: &FeatureVector) -> Result<f64> {
        match self {
            Self::Single(estimator) => estimator.predict(features),
            Self::Named(_) => Err(EngineError::inference(
                "predict_one called on a named estimator set",
            )),
        }
    }

    /// Score with every estimator of the named set
    pub fn predict_many(&self, features: &FeatureVector) -> Result<NamedPredictions> {
        match self {
            Self::Named(set) => set.predict_many(features),
            Self::Single(_) => Err(EngineError::inference(
                "predict_many called on a single estimator",
            )),
        }
    }

    /// Score with whatever this set holds
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        match self {
            Self::Single(estimator) => estimator.predict(features).map(PredictionResult::Single),
            Self::Named(set) => set.predict_many(features).map(PredictionResult::Named),
        }
    }

    /// `(name, estimator)` pairs; a single estimator is reported as `"prediction"`
    pub fn members(&self) -> Vec<(&str, &dyn Estimator)> {
        match self {
            Self::Single(estimator) => vec![("prediction", estimator.as_ref())],
            Self::Named(set) => set.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Named(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named scalar outputs in estimator insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedPredictions {
    entries: Vec<(String, f64)>,
}

impl NamedPredictions {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, name: String, value: f64) {
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NamedPredictions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Output of one prediction call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResult {
    Single(f64),
    Named(NamedPredictions),
}

impl PredictionResult {
    pub fn as_single(&self) -> Option<f64> {
        match self {
            Self::Single(value) => Some(*value),
            Self::Named(_) => None,
        }
    }

    pub fn as_named(&self) -> Option<&NamedPredictions> {
        match self {
            Self::Named(named) => Some(named),
            Self::Single(_) => None,
        }
    }
}
