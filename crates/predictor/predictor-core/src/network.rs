//! Feed-forward dense regression network
//!
//! Weights come from the training pipeline; this module only evaluates them.

use predictor_spi::{FeatureVector, ModelError, Regressor, Result};
use serde::{Deserialize, Serialize};

/// Element-wise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Linear => x,
        }
    }
}

/// One fully connected layer: `activation(weights · x + bias)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Row-major `[outputs][inputs]`
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>, activation: Activation) -> Self {
        Self {
            weights,
            bias,
            activation,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn output_dim(&self) -> usize {
        self.weights.len()
    }

    /// Affine transform then activation. Overflow in the affine part is an
    /// error; ReLU would otherwise turn a NaN into 0.
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let z: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b;
                if z.is_finite() {
                    Ok(self.activation.apply(z))
                } else {
                    Err(ModelError::Inference(format!(
                        "non-finite activation {}",
                        z
                    )))
                }
            })
            .collect()
    }
}

/// Stack of dense layers ending in a single output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Build a validated network.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        let network = Self { layers };
        network.validate()?;
        Ok(network)
    }

    /// Single linear layer `y = weights · x + bias`.
    pub fn linear(weights: Vec<f64>, bias: f64) -> Result<Self> {
        Self::new(vec![DenseLayer::new(
            vec![weights],
            vec![bias],
            Activation::Linear,
        )])
    }

    /// Check that layer shapes chain and end in one output.
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.layers.first() else {
            return Err(ModelError::ArtifactInvalid("network has no layers".to_string()));
        };
        if first.input_dim() == 0 {
            return Err(ModelError::ArtifactInvalid(
                "first layer has no inputs".to_string(),
            ));
        }

        let mut expected_inputs = first.input_dim();
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.output_dim() == 0 {
                return Err(ModelError::ArtifactInvalid(format!(
                    "layer {} has no outputs",
                    idx
                )));
            }
            if layer.bias.len() != layer.output_dim() {
                return Err(ModelError::ArtifactInvalid(format!(
                    "layer {} has {} weight rows but {} biases",
                    idx,
                    layer.output_dim(),
                    layer.bias.len()
                )));
            }
            if layer.weights.iter().any(|row| row.len() != expected_inputs) {
                return Err(ModelError::ArtifactInvalid(format!(
                    "layer {} expects {} inputs",
                    idx, expected_inputs
                )));
            }
            let non_finite = layer
                .weights
                .iter()
                .flatten()
                .chain(&layer.bias)
                .any(|v| !v.is_finite());
            if non_finite {
                return Err(ModelError::ArtifactInvalid(format!(
                    "layer {} has non-finite parameters",
                    idx
                )));
            }
            expected_inputs = layer.output_dim();
        }

        if expected_inputs != 1 {
            return Err(ModelError::ArtifactInvalid(format!(
                "network must end in 1 output, got {}",
                expected_inputs
            )));
        }
        Ok(())
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl Regressor for DenseNetwork {
    fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_dim)
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.input_dim() {
            return Err(ModelError::ShapeMismatch {
                expected: self.input_dim(),
                actual: features.len(),
            });
        }
        if !features.is_finite() {
            return Err(ModelError::Inference(
                "input features are not finite".to_string(),
            ));
        }

        let mut activations = features.as_slice().to_vec();
        for (idx, layer) in self.layers.iter().enumerate() {
            activations = layer.forward(&activations).map_err(|e| match e {
                ModelError::Inference(reason) => {
                    ModelError::Inference(format!("layer {}: {}", idx, reason))
                }
                other => other,
            })?;
        }

        match activations.as_slice() {
            [value] => Ok(*value),
            other => Err(ModelError::Inference(format!(
                "model produced {} outputs",
                other.len()
            ))),
        }
    }

    fn name(&self) -> &str {
        "dense"
    }
}
