//! Versioned model artifact: trained network plus its scaler statistics.

use predictor_spi::{ModelError, Regressor, Result, ScalerState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::feature::FEATURE_COUNT;
use crate::network::DenseNetwork;

/// Output of the training pipeline, loaded read-only by the service.
///
/// The scaler travels with the weights it was fit alongside, so inference
/// always normalizes with the statistics the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub scaler: ScalerState,
    pub model: DenseNetwork,
}

impl ModelArtifact {
    /// Assemble and validate an artifact.
    pub fn new(version: impl Into<String>, scaler: ScalerState, model: DenseNetwork) -> Result<Self> {
        let artifact = Self {
            version: version.into(),
            scaler,
            model,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check that scaler, network and feature layout agree.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ModelError::ArtifactInvalid(
                "artifact version is empty".to_string(),
            ));
        }
        self.scaler.validate()?;
        self.model.validate()?;

        if self.scaler.n_features() != FEATURE_COUNT {
            return Err(ModelError::ArtifactInvalid(format!(
                "scaler covers {} features, expected {}",
                self.scaler.n_features(),
                FEATURE_COUNT
            )));
        }
        if self.model.input_dim() != self.scaler.n_features() {
            return Err(ModelError::ArtifactInvalid(format!(
                "model takes {} inputs but scaler produces {}",
                self.model.input_dim(),
                self.scaler.n_features()
            )));
        }
        Ok(())
    }

    /// Parse and validate an artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)
            .map_err(|e| ModelError::ArtifactInvalid(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::ArtifactInvalid(e.to_string()))
    }

    /// Load an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ModelError::ArtifactMissing(path.display().to_string()),
            _ => ModelError::ArtifactMissing(format!("{}: {}", path.display(), e)),
        })?;
        let artifact = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            version = %artifact.version,
            layers = artifact.model.layers().len(),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    /// Write the artifact, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ModelError::ArtifactInvalid(format!("{}: {}", parent.display(), e))
            })?;
        }
        fs::write(path, self.to_json()?)
            .map_err(|e| ModelError::ArtifactInvalid(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Activation, DenseLayer};

    fn artifact() -> ModelArtifact {
        ModelArtifact::new(
            "dnn-2024.06",
            ScalerState::new(vec![1_700_000_000.0, 22.0], vec![86_400.0, 3.0]).unwrap(),
            DenseNetwork::linear(vec![0.1, 0.9], 22.0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let original = artifact();
        let restored = ModelArtifact::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_json_layout() {
        let value: serde_json::Value =
            serde_json::from_str(&artifact().to_json().unwrap()).unwrap();
        assert_eq!(value["version"], "dnn-2024.06");
        assert_eq!(value["scaler"]["mean"][1], 22.0);
        assert_eq!(value["model"]["layers"][0]["activation"], "linear");
    }

    #[test]
    fn test_rejects_scaler_model_width_mismatch() {
        let model = DenseNetwork::new(vec![DenseLayer::new(
            vec![vec![1.0, 1.0, 1.0]],
            vec![0.0],
            Activation::Linear,
        )])
        .unwrap();
        let scaler = ScalerState::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            ModelArtifact::new("v1", scaler, model),
            Err(ModelError::ArtifactInvalid(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let model = DenseNetwork::linear(vec![1.0], 0.0).unwrap();
        let scaler = ScalerState::new(vec![0.0], vec![1.0]).unwrap();
        assert!(ModelArtifact::new("v1", scaler, model).is_err());
    }

    #[test]
    fn test_rejects_blank_version() {
        let a = artifact();
        assert!(ModelArtifact::new("  ", a.scaler, a.model).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ModelArtifact::from_json("{\"version\": 3}"),
            Err(ModelError::ArtifactInvalid(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ModelError::ArtifactMissing(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("artifact.json");
        artifact().save(&path).unwrap();
        assert_eq!(ModelArtifact::load(&path).unwrap(), artifact());
    }
}
