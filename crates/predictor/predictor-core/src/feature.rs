//! Mapping from sensor readings to normalized model input.

use predictor_spi::{FeatureVector, Result, ScalerState};
use reading_spi::SensorReading;

/// Width of the feature vector the forecast model consumes.
pub const FEATURE_COUNT: usize = 2;

/// Feature order: `[timestamp as epoch seconds, temperature]`.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["timestamp", "temperature"];

/// Turns readings into normalized feature vectors with a fixed scaler.
///
/// The scaler is fit once by the training pipeline and only read here, so
/// transforming the same reading always yields the same vector.
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    scaler: ScalerState,
}

impl FeatureTransformer {
    pub fn new(scaler: ScalerState) -> Self {
        Self { scaler }
    }

    /// Raw, unscaled features for one reading.
    pub fn features(reading: &SensorReading) -> FeatureVector {
        FeatureVector::new(vec![reading.epoch_seconds(), reading.temperature])
    }

    /// Normalize an already extracted vector.
    pub fn normalize(&self, features: &FeatureVector) -> Result<FeatureVector> {
        self.scaler.transform(features)
    }

    /// Extract and normalize in one step.
    pub fn transform(&self, reading: &SensorReading) -> Result<FeatureVector> {
        self.normalize(&Self::features(reading))
    }

    pub fn scaler(&self) -> &ScalerState {
        &self.scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use predictor_spi::ModelError;

    fn reading() -> SensorReading {
        SensorReading::new(25.0, 60.0, Utc.timestamp_opt(1_704_110_400, 0).unwrap())
    }

    #[test]
    fn test_raw_features_order() {
        let features = FeatureTransformer::features(&reading());
        assert_eq!(features.as_slice(), &[1_704_110_400.0, 25.0]);
    }

    #[test]
    fn test_transform_uses_fixed_statistics() {
        let scaler = ScalerState::new(vec![1_704_000_000.0, 20.0], vec![100_000.0, 5.0]).unwrap();
        let transformer = FeatureTransformer::new(scaler.clone());

        let scaled = transformer.transform(&reading()).unwrap();
        assert!((scaled.as_slice()[0] - 1.104).abs() < 1e-12);
        assert!((scaled.as_slice()[1] - 1.0).abs() < 1e-12);
        assert_eq!(transformer.scaler(), &scaler);
    }

    #[test]
    fn test_repeated_transforms_are_identical() {
        let scaler = ScalerState::new(vec![1_704_000_000.0, 20.0], vec![3_600.0, 2.5]).unwrap();
        let transformer = FeatureTransformer::new(scaler);
        let first = transformer.transform(&reading()).unwrap();
        let second = transformer.transform(&reading()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_sample_is_not_collapsed() {
        // Refitting on the one sample would map it to zeros
        let scaler = ScalerState::new(vec![1_700_000_000.0, 22.0], vec![86_400.0, 3.0]).unwrap();
        let scaled = FeatureTransformer::new(scaler).transform(&reading()).unwrap();
        assert!(scaled.as_slice().iter().all(|v| v.abs() > 0.1));
    }

    #[test]
    fn test_scaler_width_mismatch() {
        let scaler = ScalerState::new(vec![0.0], vec![1.0]).unwrap();
        let err = FeatureTransformer::new(scaler)
            .transform(&reading())
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                expected: 1,
                actual: 2
            }
        );
    }
}
