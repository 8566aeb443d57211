//! Reading Store Service Provider Interface
//!
//! Defines the sensor reading model and the append-only store contract the
//! ingestion service talks to.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::ReadingStore;
pub use error::{Result, StoreError};
pub use model::{Page, SensorReading};
