//! Forecast result type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A one-step-ahead temperature forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Predicted temperature in °C, rounded to two decimal places
    pub predicted_temperature: f64,
    /// Instant the prediction applies to
    pub forecast_timestamp: DateTime<Utc>,
}
