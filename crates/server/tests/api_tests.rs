//! Integration tests for the prediction service endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use boxoffice_lib::{
    health::{components, ComponentHealth, HealthRegistry},
    Estimator, EngineError, EstimatorSet, FeatureSchema, FeatureVector, MoviePredictor,
};
use boxoffice_server::api::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const MAX_BODY: usize = 64 * 1024;

fn write_manifest(dir: &TempDir) -> std::path::PathBuf {
    let files = [
        ("columns.json", r#"["budget","runtime","main_genre_Action","main_genre_Drama"]"#),
        ("low.json", r#"{"coefficients": [0.5, 0.0, 100.0, 0.0], "intercept": 0.0}"#),
        ("median.json", r#"{"coefficients": [1.0, 0.0, 200.0, 0.0], "intercept": 0.0}"#),
        ("high.json", r#"{"coefficients": [2.0, 0.0, 400.0, 0.0], "intercept": 0.0}"#),
    ];
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    let manifest = json!({
        "schema": "columns.json",
        "version": "test-quantiles",
        "estimators": [
            {"name": "low", "path": "low.json"},
            {"name": "median", "path": "median.json"},
            {"name": "high", "path": "high.json"}
        ]
    });
    let path = dir.path().join("manifest.json");
    std::fs::write(&path, manifest.to_string()).unwrap();
    path
}

async fn app_for(predictor: MoviePredictor) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.set_model_loaded(Ok(())).await;
    let state = Arc::new(AppState::new(Arc::new(predictor), health_registry));
    (create_router(state.clone(), MAX_BODY), state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let dir = TempDir::new().unwrap();
    let predictor = MoviePredictor::from_manifest(write_manifest(&dir)).unwrap();
    app_for(predictor).await
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

struct Broken;

impl Estimator for Broken {
    fn predict(&self, _features: &FeatureVector) -> boxoffice_lib::Result<f64> {
        Err(EngineError::inference("model produced NaN"))
    }

    fn n_features(&self) -> usize {
        2
    }

    fn kind(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn test_predict_returns_named_quantiles() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(post_json(
            "/v1/predict",
            json!({"title": "Heat", "budget": 100, "runtime": 170, "genres": [{"name": "Action"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(raw.to_vec()).unwrap();
    // manifest order survives on the wire
    let low = text.find(r#""low""#).unwrap();
    let median = text.find(r#""median""#).unwrap();
    let high = text.find(r#""high""#).unwrap();
    assert!(low < median && median < high, "{}", text);

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["model_version"], "test-quantiles");
    let prediction = &body["prediction"];
    assert_eq!(prediction["low"], 150.0);
    assert_eq!(prediction["median"], 300.0);
    assert_eq!(prediction["high"], 600.0);
}

#[tokio::test]
async fn test_predict_single_returns_number() {
    let schema = FeatureSchema::from_columns(["budget", "runtime"]).unwrap();
    let model = boxoffice_lib::estimator::LinearEstimator::new(vec![2.0, 1.0], 5.0);
    let predictor = MoviePredictor::new(schema, EstimatorSet::single(model))
        .unwrap()
        .with_version("single-1");
    let (app, _state) = app_for(predictor).await;

    let response = app
        .oneshot(post_json("/v1/predict", json!({"budget": 10, "runtime": 3})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["prediction"], 28.0);
    assert_eq!(body["model_version"], "single-1");
}

#[tokio::test]
async fn test_malformed_record_returns_422() {
    let (app, state) = setup_test_app().await;

    let response = app
        .oneshot(post_json(
            "/v1/predict",
            json!({"budget": 1, "main_genre": [{"name": "Action"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "malformed_record");
    assert!(body["message"].as_str().unwrap().contains("main_genre"));
    assert!(state.health_registry.readiness().await.ready);
}

#[tokio::test]
async fn test_non_object_record_returns_422() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(post_json("/v1/predict", json!([1, 2, 3])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_inference_failure_names_estimator() {
    let schema = FeatureSchema::from_columns(["budget", "runtime"]).unwrap();
    let members: Vec<(String, Box<dyn Estimator>)> = vec![
        (
            "low".to_string(),
            Box::new(boxoffice_lib::estimator::LinearEstimator::new(vec![1.0, 1.0], 0.0)),
        ),
        ("high".to_string(), Box::new(Broken)),
    ];
    let predictor = MoviePredictor::new(schema, EstimatorSet::named(members).unwrap()).unwrap();
    let (app, _state) = app_for(predictor).await;

    let response = app
        .oneshot(post_json("/v1/predict", json!({"budget": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "inference");
    assert_eq!(body["estimator"], "high");
}

#[tokio::test]
async fn test_model_info_describes_loaded_predictor() {
    let (app, _state) = setup_test_app().await;

    let response = app.oneshot(get("/v1/model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["version"], "test-quantiles");
    assert_eq!(body["mode"], "ensemble");
    assert_eq!(body["estimators"], json!(["low", "median", "high"]));
    assert_eq!(body["schema_columns"], 4);
}

#[tokio::test]
async fn test_healthz_and_readyz_after_load() {
    let (app, _state) = setup_test_app().await;

    let response = app.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["components"][components::MODEL_ARTIFACTS].is_object());

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
}

#[tokio::test]
async fn test_unhealthy_component_fails_probes() {
    let (app, state) = setup_test_app().await;
    state
        .health_registry
        .update(components::INFERENCE, ComponentHealth::unhealthy("estimator crashed"))
        .await;

    let response = app.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/v1/predict", json!({"budget": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("boxoffice_predictions_total"));
    assert!(metrics_text.contains("boxoffice_prediction_latency_seconds_bucket"));
    assert!(metrics_text.contains("boxoffice_model_info"));
}
