//! Ingestion and forecast operations.

use chrono::{SubsecRound, Utc};
use predictor_facade::{ForecastResult, Forecaster, ModelArtifact};
use reading_facade::{paginate, single_page, Page, ReadingStore, SensorReading};
use std::sync::Arc;

use crate::error::ServiceError;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Sub-second digits kept on ingest timestamps, matching `DATETIME(6)`.
const TIMESTAMP_PRECISION: u16 = 6;

/// Orchestrates the reading store and the forecaster.
///
/// The artifact is loaded before construction and only read afterwards, so
/// one instance serves all concurrent requests without locking.
pub struct ForecastService {
    store: Arc<dyn ReadingStore>,
    forecaster: Forecaster,
}

impl ForecastService {
    pub fn new(store: Arc<dyn ReadingStore>, artifact: Arc<ModelArtifact>) -> Self {
        Self {
            store,
            forecaster: Forecaster::new(artifact),
        }
    }

    /// Record a reading stamped with the current instant.
    pub async fn insert(&self, temperature: f64, humidity: f64) -> Result<SensorReading> {
        if !temperature.is_finite() || !humidity.is_finite() {
            return Err(ServiceError::InvalidInput(
                "temperature and humidity must be finite numbers".to_string(),
            ));
        }

        let timestamp = Utc::now().trunc_subsecs(TIMESTAMP_PRECISION);
        let reading = SensorReading::new(temperature, humidity, timestamp);
        self.store.append(&reading).await?;

        tracing::debug!(temperature, humidity, %timestamp, "reading stored");
        Ok(reading)
    }

    /// Most recent reading.
    pub async fn latest(&self) -> Result<SensorReading> {
        self.store
            .latest()
            .await?
            .ok_or_else(ServiceError::no_readings)
    }

    /// Forecast the temperature one hour after the latest reading.
    pub async fn forecast(&self) -> Result<ForecastResult> {
        let reading = self.latest().await?;
        let result = self.forecaster.forecast(&reading).map_err(|e| {
            tracing::warn!(version = %self.forecaster.version(), error = %e, "inference failed");
            ServiceError::from(e)
        })?;
        Ok(result)
    }

    /// One page of stored readings, newest first.
    pub async fn history(&self, page: usize, page_size: usize) -> Result<Page> {
        let readings = self.store.all().await?;
        Ok(paginate(readings, page, page_size)?)
    }

    /// Every stored reading on one page, newest first.
    pub async fn history_all(&self) -> Result<Page> {
        Ok(single_page(self.store.all().await?))
    }

    /// Check that the store answers.
    pub async fn ping_store(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn model_version(&self) -> &str {
        self.forecaster.version()
    }

    pub fn forecaster(&self) -> &Forecaster {
        &self.forecaster
    }
}
