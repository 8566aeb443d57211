//! In-process reading store.

use async_trait::async_trait;
use reading_spi::{ReadingStore, Result, SensorReading};
use tokio::sync::RwLock;

/// Reading store held in process memory.
///
/// Used for tests and local runs without a database. Readings are kept in
/// insertion order; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RwLock<Vec<SensorReading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with readings, in insertion order.
    pub fn with_readings(readings: Vec<SensorReading>) -> Self {
        Self {
            readings: RwLock::new(readings),
        }
    }

    /// Number of stored readings.
    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    /// Whether the store holds no readings.
    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, reading: &SensorReading) -> Result<()> {
        self.readings.write().await.push(reading.clone());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<SensorReading>> {
        // max_by_key keeps the last of equal elements, i.e. the newest insert
        Ok(self
            .readings
            .read()
            .await
            .iter()
            .max_by_key(|r| r.timestamp)
            .cloned())
    }

    async fn all(&self) -> Result<Vec<SensorReading>> {
        let mut readings: Vec<SensorReading> =
            self.readings.read().await.iter().rev().cloned().collect();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(readings)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
