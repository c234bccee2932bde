//! Predictor façade
//!
//! Holds one loaded schema and its estimator(s) and runs
//! normalize → align → score for each record. Everything it owns is
//! read-only after construction, so one instance can serve concurrent
//! callers.

use crate::artifacts::ModelManifest;
use crate::error::{EngineError, Result};
use crate::estimator::{Estimator, EstimatorSet, LinearEstimator, PredictionResult};
use crate::features::{Alignment, FeatureAligner, FeatureSchema};
use crate::models::RawMovieRecord;
use crate::normalizer::RecordNormalizer;
use crate::observability::{EngineMetrics, StructuredLogger};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub struct MoviePredictor {
    schema: Arc<FeatureSchema>,
    normalizer: RecordNormalizer,
    aligner: FeatureAligner,
    estimators: EstimatorSet,
    version: String,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

impl MoviePredictor {
    /// Assemble a predictor, checking every estimator against the schema width
    pub fn new(schema: FeatureSchema, estimators: EstimatorSet) -> Result<Self> {
        Self::assemble(schema, estimators, "unversioned".to_string())
    }

    fn assemble(schema: FeatureSchema, estimators: EstimatorSet, version: String) -> Result<Self> {
        for (name, estimator) in estimators.members() {
            if estimator.n_features() != schema.len() {
                return Err(EngineError::model_load(
                    format!("<estimator {}>", name),
                    format!(
                        "estimator expects {} features but schema has {} columns",
                        estimator.n_features(),
                        schema.len()
                    ),
                ));
            }
        }

        let predictor = Self {
            schema: Arc::new(schema),
            normalizer: RecordNormalizer::new(),
            aligner: FeatureAligner::default(),
            estimators,
            version,
            metrics: EngineMetrics::new(),
            logger: StructuredLogger::new("predictor"),
        };

        let names = predictor.estimator_names();
        predictor
            .metrics
            .set_model(&predictor.version, predictor.mode(), names.len());
        predictor
            .logger
            .log_model_loaded(&predictor.version, predictor.mode(), predictor.schema.len(), &names);
        Ok(predictor)
    }

    /// One linear model plus its schema
    pub fn load_single(model_path: impl AsRef<Path>, schema_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_loaded_manifest(ModelManifest::single(schema_path.as_ref(), model_path.as_ref()))
    }

    /// Named linear models sharing one schema, kept in the given order
    pub fn load_ensemble<P: AsRef<Path>>(schema_path: impl AsRef<Path>, members: &[(&str, P)]) -> Result<Self> {
        let schema_path = schema_path.as_ref();
        let schema = FeatureSchema::load(schema_path)?;
        let mut loaded: Vec<(String, Box<dyn Estimator>)> = Vec::with_capacity(members.len());
        for (name, path) in members {
            let estimator: Box<dyn Estimator> = Box::new(LinearEstimator::load(path)?);
            loaded.push((name.to_string(), estimator));
        }
        let estimators =
            EstimatorSet::named(loaded).map_err(|reason| EngineError::model_load(schema_path, reason))?;
        Self::new(schema, estimators)
    }

    /// Load schema and estimators listed in a manifest
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_loaded_manifest(ModelManifest::load(path)?)
    }

    fn from_loaded_manifest(manifest: ModelManifest) -> Result<Self> {
        let schema = manifest.load_schema()?;
        let estimators = manifest.load_estimators(schema.len())?;
        Self::assemble(schema, estimators, manifest.version)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        let names = self.estimator_names();
        self.metrics.set_model(&self.version, self.mode(), names.len());
        self
    }

    pub fn estimator_names(&self) -> Vec<&str> {
        self.estimators.members().into_iter().map(|(name, _)| name).collect()
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn mode(&self) -> &'static str {
        match self.estimators {
            EstimatorSet::Single(_) => "single",
            EstimatorSet::Named(_) => "ensemble",
        }
    }

    /// Normalize and align a record without scoring it
    pub fn features(&self, raw: &RawMovieRecord) -> Result<Alignment> {
        let record = self.normalizer.normalize(raw)?;
        self.aligner.align_detailed(&record, &self.schema)
    }

    /// Run normalize → align → score for one record
    pub fn predict(&self, raw: &RawMovieRecord) -> Result<PredictionResult> {
        self.predict_detailed(raw).map(|(result, _)| result)
    }

    /// Like [`predict`](Self::predict), also returning the alignment that was scored
    pub fn predict_detailed(&self, raw: &RawMovieRecord) -> Result<(PredictionResult, Alignment)> {
        let start = Instant::now();
        let title = raw.get_str("title");

        let outcome = self.features(raw).and_then(|alignment| {
            self.estimators
                .predict(&alignment.vector)
                .map(|result| (result, alignment))
        });

        match outcome {
            Ok((result, alignment)) => {
                let elapsed = start.elapsed();
                let dropped = alignment.dropped.len();
                self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
                self.metrics.inc_predictions();
                self.metrics.add_dropped_columns(dropped);
                self.logger.log_prediction(title, elapsed.as_micros(), dropped);
                Ok((result, alignment))
            }
            Err(e) => {
                self.metrics.inc_prediction_errors(e.kind());
                self.logger.log_prediction_failed(title, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimatorSet;
    use serde_json::json;

    fn genre_schema() -> FeatureSchema {
        FeatureSchema::from_columns(["budget", "runtime", "main_genre_Action", "main_genre_Drama"]).unwrap()
    }

    fn record(value: serde_json::Value) -> RawMovieRecord {
        RawMovieRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_single_prediction() {
        let model = LinearEstimator::new(vec![2.0, 1000.0, 5_000_000.0, -1_000_000.0], 100.0);
        let predictor = MoviePredictor::new(genre_schema(), EstimatorSet::single(model)).unwrap();

        let result = predictor
            .predict(&record(json!({"budget": 1000000, "runtime": 120, "main_genre": "Action"})))
            .unwrap();
        assert_eq!(result.as_single(), Some(100.0 + 2_000_000.0 + 120_000.0 + 5_000_000.0));
        assert_eq!(predictor.mode(), "single");
    }

    #[test]
    fn test_nested_genres_are_normalized_before_alignment() {
        let model = LinearEstimator::new(vec![0.0, 0.0, 1.0, 10.0], 0.0);
        let predictor = MoviePredictor::new(genre_schema(), EstimatorSet::single(model)).unwrap();

        let result = predictor
            .predict(&record(json!({"genres": [{"name": "Drama"}, {"name": "Action"}]})))
            .unwrap();
        assert_eq!(result.as_single(), Some(10.0));
    }

    #[test]
    fn test_width_mismatch_fails_at_construction() {
        let model = LinearEstimator::new(vec![1.0, 1.0], 0.0);
        let err = MoviePredictor::new(genre_schema(), EstimatorSet::single(model)).err().unwrap();
        assert!(matches!(err, EngineError::ModelLoad { .. }));
    }

    #[test]
    fn test_malformed_record_propagates() {
        let model = LinearEstimator::new(vec![1.0; 4], 0.0);
        let predictor = MoviePredictor::new(genre_schema(), EstimatorSet::single(model)).unwrap();
        let err = predictor
            .predict(&record(json!({"main_genre": [{"name": "Action"}]})))
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedRecord { ref field, .. } if field == "main_genre"));
    }

    #[test]
    fn test_features_reports_dropped_columns() {
        let model = LinearEstimator::new(vec![1.0; 4], 0.0);
        let predictor = MoviePredictor::new(genre_schema(), EstimatorSet::single(model)).unwrap();
        let alignment = predictor
            .features(&record(json!({"budget": 500000, "runtime": 90, "main_genre": "Horror"})))
            .unwrap();
        assert_eq!(alignment.vector.values(), [500000.0, 90.0, 0.0, 0.0]);
        assert_eq!(alignment.dropped, vec!["main_genre_Horror".to_string()]);
    }

    #[test]
    fn test_predict_detailed_returns_scored_alignment() {
        let model = LinearEstimator::new(vec![1.0, 0.0, 7.0, 0.0], 0.0);
        let predictor = MoviePredictor::new(genre_schema(), EstimatorSet::single(model)).unwrap();
        let (result, alignment) = predictor
            .predict_detailed(&record(json!({"budget": 3, "main_genre": "Western", "genres": [{"name": "Action"}]})))
            .unwrap();
        assert_eq!(result.as_single(), Some(3.0));
        assert_eq!(alignment.vector.values(), [3.0, 0.0, 0.0, 0.0]);
        assert_eq!(alignment.dropped, vec!["main_genre_Western".to_string()]);
    }

    #[test]
    fn test_predictor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MoviePredictor>();
    }
}
