//! Predictor Core
//!
//! Feature transformation, the dense regression network, versioned model
//! artifacts, the forecaster used at request time and the offline training
//! pipelines (least squares or a ReLU network) that produce artifacts.

pub mod artifact;
pub mod dense_trainer;
pub mod feature;
pub mod forecaster;
pub mod network;
pub mod training;

// Re-export SPI types for implementations
pub use predictor_spi::{
    FeatureVector, ForecastResult, ModelError, Regressor, Result, ScalerState,
};

pub use artifact::ModelArtifact;
pub use dense_trainer::{fit_dense, DenseTrainerConfig};
pub use feature::{FeatureTransformer, FEATURE_COUNT, FEATURE_NAMES};
pub use forecaster::{round_to, Forecaster, FORECAST_HORIZON_SECS, PREDICTION_DECIMALS};
pub use network::{Activation, DenseLayer, DenseNetwork};
pub use training::{fit_scaler, train, TrainingConfig, TrainingReport};

pub mod utils {
    //! Utility functions for model evaluation

    pub mod metrics {
        //! Forecast accuracy metrics

        /// Mean Absolute Error
        pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
            if actual.len() != predicted.len() || actual.is_empty() {
                return f64::NAN;
            }
            let sum: f64 = actual
                .iter()
                .zip(predicted.iter())
                .map(|(a, p)| (a - p).abs())
                .sum();
            sum / actual.len() as f64
        }

        /// Mean Squared Error
        pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
            if actual.len() != predicted.len() || actual.is_empty() {
                return f64::NAN;
            }
            let sum: f64 = actual
                .iter()
                .zip(predicted.iter())
                .map(|(a, p)| (a - p).powi(2))
                .sum();
            sum / actual.len() as f64
        }

        /// Root Mean Squared Error
        pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
            mse(actual, predicted).sqrt()
        }
    }

    pub mod validation {
        //! Temporal splits

        /// Split index for a train-test split respecting temporal order.
        ///
        /// The ratio is clamped to [0.1, 0.9] and both sides keep at least
        /// one element when `len >= 2`.
        pub fn train_test_split_index(len: usize, test_ratio: f64) -> usize {
            if len < 2 {
                return len;
            }
            let ratio = test_ratio.clamp(0.1, 0.9);
            let split_idx = ((1.0 - ratio) * len as f64) as usize;
            split_idx.max(1).min(len - 1)
        }
    }

}
