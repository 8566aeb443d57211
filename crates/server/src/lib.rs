//! # ecosense server
//!
//! Ingests temperature and humidity readings, serves the latest reading and
//! forecasts the temperature one hour ahead with a pre-trained model.

use axum::{
    routing::{get, post},
    Router,
};
use predictor_facade::ModelArtifact;
use reading_facade::{MemoryStore, MySqlStore, ReadingStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod service;

pub use config::{ServerConfig, StoreBackend};
pub use error::{ServiceError, StartupError};
pub use service::ForecastService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

/// Build the router with all endpoints and middleware.
pub fn create_router(service: Arc<ForecastService>) -> Router {
    let state = AppState { service };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints (Kubernetes-compatible)
        .route("/health/live", get(routes::liveness))
        .route("/health/ready", get(routes::readiness))
        // API endpoints
        .route("/insert_data", post(routes::insert_data))
        .route("/latest_data", get(routes::latest_data))
        .route("/predict_next_hour", get(routes::predict_next_hour))
        .route("/all_data", get(routes::all_data))
        // Middleware layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the model artifact, then open the configured store.
///
/// The artifact comes first: without it the service must not start, and
/// there is no point touching the database.
pub async fn bootstrap(config: &ServerConfig) -> Result<ForecastService, StartupError> {
    let artifact = Arc::new(ModelArtifact::load(&config.model_path)?);

    let store: Arc<dyn ReadingStore> = match config.backend {
        StoreBackend::MySql => {
            let store = MySqlStore::connect(&config.store).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory reading store; readings are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(
        store = store.name(),
        model_version = %artifact.version,
        "service bootstrapped"
    );
    Ok(ForecastService::new(store, artifact))
}
