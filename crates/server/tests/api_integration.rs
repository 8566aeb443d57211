//! HTTP-level tests against the in-memory store

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use http_body_util::BodyExt;
use predictor_facade::{
    round_to, DenseNetwork, FeatureTransformer, ModelArtifact, ModelError, Regressor,
    ScalerState, PREDICTION_DECIMALS,
};
use reading_facade::{MemoryStore, ReadingStore, SensorReading, StoreError};
use serde_json::Value;
use server::{
    bootstrap, create_router, ForecastService, ServerConfig, StartupError, StoreBackend,
};
use std::sync::Arc;
use tower::ServiceExt;

fn artifact() -> Arc<ModelArtifact> {
    Arc::new(
        ModelArtifact::new(
            "api-test",
            ScalerState::new(vec![1_700_000_000.0, 21.0], vec![2_000_000.0, 4.0]).unwrap(),
            DenseNetwork::linear(vec![0.4, 3.3], 21.0).unwrap(),
        )
        .unwrap(),
    )
}

fn app_with(store: Arc<dyn ReadingStore>, artifact: Arc<ModelArtifact>) -> Router {
    create_router(Arc::new(ForecastService::new(store, artifact)))
}

fn app() -> Router {
    app_with(Arc::new(MemoryStore::new()), artifact())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn insert(form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/insert_data")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

/// Mock implementation: every call fails as if the database were down
struct DownStore;

#[async_trait]
impl ReadingStore for DownStore {
    fn name(&self) -> &str {
        "down"
    }

    async fn append(&self, _reading: &SensorReading) -> reading_facade::Result<()> {
        Err(StoreError::Connection("Can't connect to MySQL server".to_string()))
    }

    async fn latest(&self) -> reading_facade::Result<Option<SensorReading>> {
        Err(StoreError::Connection("Can't connect to MySQL server".to_string()))
    }

    async fn all(&self) -> reading_facade::Result<Vec<SensorReading>> {
        Err(StoreError::Connection("Can't connect to MySQL server".to_string()))
    }

    async fn ping(&self) -> reading_facade::Result<()> {
        Err(StoreError::Connection("Can't connect to MySQL server".to_string()))
    }
}

#[tokio::test]
async fn test_insert_then_latest_round_trip() {
    let app = app();

    let (status, body) = send(&app, insert("temperature=25.0&humidity=60.0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data inserted successfully");

    let (status, body) = send(&app, get("/latest_data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["temperature"], 25.0);
    assert_eq!(body["humidity"], 60.0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_empty_store_is_not_found() {
    let app = app();

    let (status, body) = send(&app, get("/latest_data")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No temperature data found in the database.");

    let (status, _) = send(&app, get("/predict_next_hour")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predict_next_hour_scenario() {
    let app = app();
    send(&app, insert("temperature=25.0&humidity=60.0")).await;

    let (_, latest) = send(&app, get("/latest_data")).await;
    let stamped: DateTime<Utc> = latest["timestamp"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(&app, get("/predict_next_hour")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let artifact = artifact();
    let reading = SensorReading::new(25.0, 60.0, stamped);
    let scaled = artifact
        .scaler
        .transform(&FeatureTransformer::features(&reading))
        .unwrap();
    let expected = round_to(artifact.model.predict(&scaled).unwrap(), PREDICTION_DECIMALS);
    assert_eq!(body["predicted_temperature"].as_f64().unwrap(), expected);

    let forecast_at =
        NaiveDateTime::parse_from_str(body["timestamp"].as_str().unwrap(), "%Y-%m-%d %H:%M:%S")
            .unwrap();
    let expected_at = (stamped + Duration::hours(1)).naive_utc();
    assert_eq!(forecast_at, expected_at.with_nanosecond(0).unwrap());
}

#[tokio::test]
async fn test_predict_is_deterministic() {
    let app = app();
    send(&app, insert("temperature=19.5&humidity=48.0")).await;

    let (_, first) = send(&app, get("/predict_next_hour")).await;
    let (_, second) = send(&app, get("/predict_next_hour")).await;
    assert_eq!(first, second);

    let cents = first["predicted_temperature"].as_f64().unwrap() * 100.0;
    assert!((cents - cents.round()).abs() < 1e-6);
}

#[tokio::test]
async fn test_malformed_form_is_client_error() {
    let app = app();
    let (status, _) = send(&app, insert("temperature=warm&humidity=60")).await;
    assert!(status.is_client_error());

    let (status, _) = send(&app, get("/latest_data")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_finite_reading_is_bad_request() {
    let (status, body) = send(&app(), insert("temperature=NaN&humidity=60")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_storage_failure_is_500_with_detail() {
    let app = app_with(Arc::new(DownStore), artifact());

    let (status, body) = send(&app, insert("temperature=25.0&humidity=60.0")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Can't connect to MySQL server"));

    let (status, _) = send(&app, get("/latest_data")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_inference_failure_is_500() {
    let exploding = Arc::new(
        ModelArtifact::new(
            "overflow",
            ScalerState::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap(),
            DenseNetwork::linear(vec![f64::MAX, f64::MAX], 0.0).unwrap(),
        )
        .unwrap(),
    );
    let app = app_with(Arc::new(MemoryStore::new()), exploding);
    send(&app, insert("temperature=25.0&humidity=60.0")).await;

    let (status, body) = send(&app, get("/predict_next_hour")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Model error"));
}

#[tokio::test]
async fn test_all_data_without_query_returns_everything() {
    let app = app();
    for i in 0..12 {
        let form = format!("temperature={}&humidity=50", 20 + i);
        send(&app, insert(&form)).await;
    }

    let (status, body) = send(&app, get("/all_data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 12);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["has_next"], false);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 12);
    assert_eq!(data[0]["temperature"], 31.0);
    assert_eq!(data[11]["temperature"], 20.0);
}

#[tokio::test]
async fn test_all_data_empty_store() {
    let (status, body) = send(&app(), get("/all_data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_all_data_pages() {
    let app = app();
    for i in 0..7 {
        let form = format!("temperature={}&humidity=50", 20 + i);
        send(&app, insert(&form)).await;
    }

    let (status, body) = send(&app, get("/all_data?page=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 5);
    assert_eq!(body["total_items"], 7);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_previous"], false);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (_, body) = send(&app, get("/all_data?page=2&page_size=5")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_next"], false);
    assert_eq!(body["has_previous"], true);

    let (_, body) = send(&app, get("/all_data?page_size=3")).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, _) = send(&app, get("/all_data?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (status, body) = send(&app(), get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = send(&app(), get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_version"], "api-test");

    let down = app_with(Arc::new(DownStore), artifact());
    let (status, body) = send(&down, get("/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_missing_artifact_prevents_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        model_path: dir.path().join("dnn.json"),
        backend: StoreBackend::Memory,
        ..ServerConfig::default()
    };

    match bootstrap(&config).await {
        Err(StartupError::Model(ModelError::ArtifactMissing(_))) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("service started without a model"),
    }
}

#[tokio::test]
async fn test_bootstrap_with_saved_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artifact.json");
    artifact().save(&path).unwrap();

    let config = ServerConfig {
        model_path: path,
        backend: StoreBackend::Memory,
        ..ServerConfig::default()
    };
    let service = bootstrap(&config).await.unwrap();
    assert_eq!(service.model_version(), "api-test");
}

#[tokio::test]
async fn test_concurrent_forecasts_share_one_scaler() {
    let service = Arc::new(ForecastService::new(Arc::new(MemoryStore::new()), artifact()));
    service.insert(23.0, 51.0).await.unwrap();
    let before = service.forecaster().scaler().clone();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move { service.forecast().await.unwrap() }));
    }
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(service.forecaster().scaler(), &before);
}
