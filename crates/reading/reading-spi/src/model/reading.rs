//! Sensor reading type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped temperature and humidity sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Instant the reading was ingested
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    /// Create a new reading.
    pub fn new(temperature: f64, humidity: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            temperature,
            humidity,
            timestamp,
        }
    }

    /// Timestamp as fractional seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> f64 {
        self.timestamp.timestamp() as f64
            + f64::from(self.timestamp.timestamp_subsec_micros()) / 1_000_000.0
    }
}
