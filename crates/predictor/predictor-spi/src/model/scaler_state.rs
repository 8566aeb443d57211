//! Learned normalization statistics.

use serde::{Deserialize, Serialize};

use super::FeatureVector;
use crate::error::{ModelError, Result};

/// Per-feature mean and scale learned once from a training corpus.
///
/// Applying the state maps each raw feature `x` to `(x - mean) / scale`. The
/// state is configuration: it is loaded with the model artifact and never
/// refit from live requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl ScalerState {
    /// Create a validated state.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let state = Self { mean, scale };
        state.validate()?;
        Ok(state)
    }

    /// Check dimensions and values.
    ///
    /// Deserialized states bypass [`ScalerState::new`], so loaders call this.
    pub fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            return Err(ModelError::ArtifactInvalid(
                "scaler has no features".to_string(),
            ));
        }
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::ArtifactInvalid(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ModelError::ArtifactInvalid(
                "scaler mean is not finite".to_string(),
            ));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ModelError::ArtifactInvalid(
                "scaler scale must be finite and positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of features this state normalizes.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Normalize a raw feature vector.
    pub fn transform(&self, features: &FeatureVector) -> Result<FeatureVector> {
        if features.len() != self.n_features() {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        Ok(features
            .as_slice()
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect::<Vec<_>>()
            .into())
    }
}
