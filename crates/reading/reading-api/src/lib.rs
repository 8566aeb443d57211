//! Reading Store Consumer API
//!
//! Configuration types for connecting to the reading store.

pub mod config;

pub use config::{ConfigError, StoreConfig, StoreConfigBuilder};

// Re-export from SPI
pub use reading_spi::{Page, ReadingStore, Result, SensorReading, StoreError};
