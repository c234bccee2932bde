//! Box-office outcome prediction engine
//!
//! This crate provides the core functionality for:
//! - Normalizing raw provider movie records
//! - Aligning records to the feature schema a model was trained on
//! - Scoring with a single estimator or a named quantile ensemble
//! - Loading model artifacts from a manifest
//! - Resumable batch collection of training records
//! - Health checks and observability

pub mod artifacts;
pub mod collection;
pub mod error;
pub mod estimator;
pub mod features;
pub mod health;
pub mod models;
pub mod normalizer;
pub mod observability;
pub mod predictor;

pub use error::{EngineError, Result};
pub use estimator::{Estimator, EstimatorSet, NamedEstimatorSet, NamedPredictions, PredictionResult};
pub use features::{FeatureAligner, FeatureEntry, FeatureSchema, FeatureVector, SchemaBuilder};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::*;
pub use normalizer::{extract_primary, RecordNormalizer};
pub use observability::{EngineMetrics, StructuredLogger};
pub use predictor::MoviePredictor;
