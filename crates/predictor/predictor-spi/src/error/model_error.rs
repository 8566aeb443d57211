//! Model error types

use thiserror::Error;

/// Errors raised while loading, training or invoking a forecast model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The artifact file does not exist or cannot be read
    #[error("Model artifact missing: {0}")]
    ArtifactMissing(String),

    /// The artifact was read but its contents are unusable
    #[error("Model artifact invalid: {0}")]
    ArtifactInvalid(String),

    /// Feature vector width does not match what the model or scaler expects
    #[error("Shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Inference produced no usable value
    #[error("Inference failed: {0}")]
    Inference(String),

    /// The training pipeline could not fit a model
    #[error("Training failed: {0}")]
    Training(String),
}
