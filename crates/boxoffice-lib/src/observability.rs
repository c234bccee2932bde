//! Observability infrastructure for the prediction engine
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes, dropped feature columns, loaded model)
//! - Structured logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors: IntCounterVec,
    dropped_columns_total: IntCounter,
    estimators_loaded: IntGauge,
    model_info: GaugeVec,
    records_collected_total: IntCounter,
    collection_failures_total: IntCounter,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "boxoffice_prediction_latency_seconds",
                "Time spent normalizing, aligning and scoring one record",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "boxoffice_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter_vec!(
                "boxoffice_prediction_errors_total",
                "Prediction failures by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            dropped_columns_total: register_int_counter!(
                "boxoffice_dropped_feature_columns_total",
                "Encoded columns dropped because the schema has never seen them"
            )
            .expect("Failed to register dropped_feature_columns_total"),

            estimators_loaded: register_int_gauge!(
                "boxoffice_estimators_loaded",
                "Number of estimators held by the loaded predictor"
            )
            .expect("Failed to register estimators_loaded"),

            model_info: register_gauge_vec!(
                "boxoffice_model_info",
                "Information about the currently loaded model artifacts",
                &["version", "mode"]
            )
            .expect("Failed to register model_info"),

            records_collected_total: register_int_counter!(
                "boxoffice_records_collected_total",
                "Raw movie records written by the batch collector"
            )
            .expect("Failed to register records_collected_total"),

            collection_failures_total: register_int_counter!(
                "boxoffice_collection_failures_total",
                "Titles the batch collector could not fetch"
            )
            .expect("Failed to register collection_failures_total"),
        }
    }
}

/// Handle to the process-wide engine metrics
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner().prediction_errors.with_label_values(&[kind]).inc();
    }

    pub fn add_dropped_columns(&self, count: usize) {
        self.inner().dropped_columns_total.inc_by(count as u64);
    }

    /// Record the loaded model; replaces any previous version label
    pub fn set_model(&self, version: &str, mode: &str, estimators: usize) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, mode])
            .set(1.0);
        self.inner().estimators_loaded.set(estimators as i64);
    }

    pub fn inc_records_collected(&self) {
        self.inner().records_collected_total.inc();
    }

    pub fn inc_collection_failures(&self) {
        self.inner().collection_failures_total.inc();
    }
}

/// Structured logger for engine events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_version: &str) {
        info!(
            event = "service_started",
            component = %self.component,
            service_version = %version,
            model_version = %model_version,
            "Prediction service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            component = %self.component,
            reason = %reason,
            "Prediction service shutting down"
        );
    }

    pub fn log_model_loaded(&self, version: &str, mode: &str, schema_columns: usize, estimators: &[&str]) {
        info!(
            event = "model_loaded",
            component = %self.component,
            model_version = %version,
            mode = %mode,
            schema_columns = schema_columns,
            estimators = ?estimators,
            "Model artifacts loaded"
        );
    }

    pub fn log_prediction(&self, title: Option<&str>, elapsed_us: u128, dropped_columns: usize) {
        debug!(
            event = "prediction_generated",
            component = %self.component,
            title = ?title,
            elapsed_us = elapsed_us,
            dropped_columns = dropped_columns,
            "Generated prediction"
        );
    }

    pub fn log_prediction_failed(&self, title: Option<&str>, kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            component = %self.component,
            title = ?title,
            kind = %kind,
            error = %error,
            "Prediction failed"
        );
    }

    pub fn log_collection_progress(&self, processed: usize, remaining: usize, failures: usize) {
        info!(
            event = "collection_progress",
            component = %self.component,
            processed = processed,
            remaining = remaining,
            failures = failures,
            "Saved collection batch"
        );
    }

    pub fn log_fetch_failed(&self, title: &str, error: &str) {
        warn!(
            event = "fetch_failed",
            component = %self.component,
            title = %title,
            error = %error,
            "Could not fetch movie record, skipping"
        );
    }
}
