//! Predictor Service Provider Interface
//!
//! Defines the feature, normalization and regressor contracts shared by the
//! forecast service and the offline training pipeline.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::Regressor;
pub use error::{ModelError, Result};
pub use model::{FeatureVector, ForecastResult, ScalerState};
