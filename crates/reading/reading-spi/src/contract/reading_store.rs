//! Append-only store contract for sensor readings.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::SensorReading;

/// Durable, append-only table of sensor readings, queryable by recency.
///
/// Implementations must be safe to share across concurrent requests. A
/// backend that holds connections scopes each one to a single call and
/// releases it on every exit path.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Backend name, used in logs and health reports.
    fn name(&self) -> &str;

    /// Append a reading. Either the whole reading is persisted or nothing is.
    async fn append(&self, reading: &SensorReading) -> Result<()>;

    /// Most recent reading by timestamp, ties broken by insertion order.
    ///
    /// Returns `Ok(None)` when the store is empty.
    async fn latest(&self) -> Result<Option<SensorReading>>;

    /// Every stored reading, newest first.
    async fn all(&self) -> Result<Vec<SensorReading>>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}
