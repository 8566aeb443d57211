//! Regressor trait for forecast models

use crate::error::Result;
use crate::model::FeatureVector;

/// Deterministic mapping from a normalized feature vector to a scalar.
///
/// Implementations are immutable after construction so a single instance can
/// serve concurrent requests without locking.
pub trait Regressor: Send + Sync {
    /// Number of features the model expects
    fn input_dim(&self) -> usize;

    /// Predict the next-step value for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Name of this model family
    fn name(&self) -> &str;
}
