//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use boxoffice_lib::{
    health::{ComponentStatus, HealthRegistry},
    EngineError, MoviePredictor, PredictionResult, RawMovieRecord,
};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<MoviePredictor>,
    pub health_registry: HealthRegistry,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(predictor: Arc<MoviePredictor>, health_registry: HealthRegistry) -> Self {
        Self {
            predictor,
            health_registry,
            loaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: PredictionResult,
    pub model_version: String,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub version: String,
    pub mode: &'static str,
    pub estimators: Vec<String>,
    pub schema_columns: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimator: Option<String>,
}

/// Engine failure mapped onto an HTTP status
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, estimator) = match &self.0 {
            EngineError::MalformedRecord { .. } => (StatusCode::UNPROCESSABLE_ENTITY, None),
            EngineError::Inference { estimator, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, estimator.clone())
            }
            EngineError::ModelLoad { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
            estimator,
        };
        (status, Json(body)).into_response()
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<PredictResponse>, ApiError> {
    let record = RawMovieRecord::from_value(body)?;
    let outcome = state.predictor.predict(&record);

    match &outcome {
        Ok(_) => state.health_registry.record_inference(true).await,
        Err(EngineError::Inference { .. }) => state.health_registry.record_inference(false).await,
        Err(_) => {}
    }

    Ok(Json(PredictResponse {
        prediction: outcome?,
        model_version: state.predictor.version().to_string(),
    }))
}

async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    let predictor = &state.predictor;
    Json(ModelInfo {
        version: predictor.version().to_string(),
        mode: predictor.mode(),
        estimators: predictor
            .estimator_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        schema_columns: predictor.schema().len(),
        loaded_at: state.loaded_at,
    })
}

/// 200 while healthy or degraded, 503 once anything is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

pub fn create_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/predict", post(predict))
        .route("/v1/model", get(model_info))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(addr: &str, router: Router, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
