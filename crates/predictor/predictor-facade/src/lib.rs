//! Predictor Facade
//!
//! High-level API for forecasting. Re-exports all public types from the
//! predictor stack for convenient usage.

// Re-export everything from core (which includes the SPI types)
pub use predictor_core::*;

// Explicit re-exports for documentation
pub use predictor_core::utils;

// Re-export SPI traits
pub use predictor_spi::{
    FeatureVector, ForecastResult, ModelError, Regressor, ScalerState,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use predictor_core::{
        DenseTrainerConfig, FeatureTransformer, Forecaster, ModelArtifact, TrainingConfig,
        TrainingReport,
    };
    pub use predictor_spi::{
        FeatureVector, ForecastResult, ModelError, Regressor, Result, ScalerState,
    };
}
