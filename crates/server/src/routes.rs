//! API route handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use chrono::{DateTime, Utc};
use reading_facade::SensorReading;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::AppState;

/// Layout of forecast timestamps in responses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rows per page when the client asks for a page but not a size.
pub const DEFAULT_PAGE_SIZE: usize = 5;

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
pub struct InsertForm {
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatestResponse {
    pub status: String,
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub status: String,
    pub predicted_temperature: f64,
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllDataResponse {
    pub status: String,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub data: Vec<SensorReading>,
}

pub async fn insert_data(
    State(state): State<AppState>,
    Form(form): Form<InsertForm>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.service.insert(form.temperature, form.humidity).await?;
    Ok(Json(MessageResponse {
        message: "Data inserted successfully".to_string(),
    }))
}

pub async fn latest_data(
    State(state): State<AppState>,
) -> Result<Json<LatestResponse>, ServiceError> {
    let reading = state.service.latest().await?;
    Ok(Json(LatestResponse {
        status: SUCCESS.to_string(),
        temperature: reading.temperature,
        humidity: reading.humidity,
        timestamp: reading.timestamp,
    }))
}

pub async fn predict_next_hour(
    State(state): State<AppState>,
) -> Result<Json<PredictResponse>, ServiceError> {
    let forecast = state.service.forecast().await?;
    Ok(Json(PredictResponse {
        status: SUCCESS.to_string(),
        predicted_temperature: forecast.predicted_temperature,
        timestamp: forecast
            .forecast_timestamp
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    }))
}

/// Stored readings, newest first.
///
/// Without `page` or `page_size` the whole feed is returned as one page, for
/// dashboards that page on their side.
pub async fn all_data(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<AllDataResponse>, ServiceError> {
    let page = match (query.page, query.page_size) {
        (None, None) => state.service.history_all().await?,
        (page, page_size) => {
            state
                .service
                .history(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
                .await?
        }
    };

    Ok(Json(AllDataResponse {
        status: SUCCESS.to_string(),
        page: page.page,
        page_size: page.page_size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        data: page.items,
    }))
}

/// Liveness probe - is the server running?
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - can the store be reached?
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store = match state.service.ping_store().await {
        Ok(()) => serde_json::json!({ "name": state.service.store_name(), "status": "healthy" }),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            serde_json::json!({
                "name": state.service.store_name(),
                "status": "unhealthy",
                "message": e.to_string()
            })
        }
    };
    let healthy = store["status"] == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "ready" } else { "not_ready" },
            "version": env!("CARGO_PKG_VERSION"),
            "model_version": state.service.model_version(),
            "checks": [store],
        })),
    )
}
