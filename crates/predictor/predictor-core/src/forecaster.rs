//! Request-time forecasting over a loaded artifact.

use chrono::Duration;
use predictor_spi::{ForecastResult, ModelError, Regressor, Result, ScalerState};
use reading_spi::SensorReading;
use std::sync::Arc;

use crate::artifact::ModelArtifact;
use crate::feature::FeatureTransformer;

/// Offset between the input reading and the forecast instant.
pub const FORECAST_HORIZON_SECS: i64 = 3_600;

/// Decimal places kept in predicted temperatures.
pub const PREDICTION_DECIMALS: i32 = 2;

/// Round half away from zero to `decimals` places.
///
/// Values too large to scale are already coarser than the requested
/// precision and come back unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Produces one-step-ahead forecasts from a shared, immutable artifact.
///
/// Cloning is cheap and every clone reads the same artifact, so the scaler
/// statistics seen by concurrent requests are always the ones loaded at
/// startup.
#[derive(Debug, Clone)]
pub struct Forecaster {
    artifact: Arc<ModelArtifact>,
    transformer: FeatureTransformer,
}

impl Forecaster {
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        let transformer = FeatureTransformer::new(artifact.scaler.clone());
        Self {
            artifact,
            transformer,
        }
    }

    /// The forecast horizon as a duration.
    pub fn horizon() -> Duration {
        Duration::seconds(FORECAST_HORIZON_SECS)
    }

    /// Forecast the temperature one horizon after `reading`.
    pub fn forecast(&self, reading: &SensorReading) -> Result<ForecastResult> {
        let features = self.transformer.transform(reading)?;
        let raw = self.artifact.model.predict(&features)?;

        let forecast_timestamp = reading
            .timestamp
            .checked_add_signed(Self::horizon())
            .ok_or_else(|| {
                ModelError::Inference("forecast timestamp out of range".to_string())
            })?;

        tracing::debug!(
            version = %self.artifact.version,
            raw,
            "forecast computed"
        );

        Ok(ForecastResult {
            predicted_temperature: round_to(raw, PREDICTION_DECIMALS),
            forecast_timestamp,
        })
    }

    pub fn artifact(&self) -> &Arc<ModelArtifact> {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    /// Scaler applied to every request.
    pub fn scaler(&self) -> &ScalerState {
        self.transformer.scaler()
    }
}
