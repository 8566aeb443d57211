//! Mini-batch Adam training for ReLU [`DenseNetwork`] regressors.
//!
//! Targets are standardized while training and the statistics are folded
//! back into the output layer, so the returned network predicts raw values
//! and serializes in the same layout as any other artifact model.

use predictor_spi::{FeatureVector, ModelError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::network::{Activation, DenseLayer, DenseNetwork};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Hyperparameters for the ReLU network trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseTrainerConfig {
    /// Widths of the ReLU hidden layers, input side first
    pub hidden_layers: Vec<usize>,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for weight initialization and batch shuffling
    pub seed: u64,
}

impl Default for DenseTrainerConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![64, 32, 16],
            epochs: 150,
            batch_size: 16,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

impl DenseTrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers.iter().any(|&w| w == 0) {
            return Err(ModelError::Training(
                "hidden layer widths must be positive".to_string(),
            ));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(ModelError::Training(
                "epochs and batch_size must be positive".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::Training(format!(
                "invalid learning rate {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Same shape as a layer's parameters; holds gradients or Adam moments.
#[derive(Clone)]
struct LayerBuffers {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LayerBuffers {
    fn zeros(layer: &DenseLayer) -> Self {
        Self {
            weights: vec![vec![0.0; layer.input_dim()]; layer.output_dim()],
            bias: vec![0.0; layer.output_dim()],
        }
    }
}

struct Adam {
    m: Vec<LayerBuffers>,
    v: Vec<LayerBuffers>,
    step: i32,
    learning_rate: f64,
}

impl Adam {
    fn new(layers: &[DenseLayer], learning_rate: f64) -> Self {
        let zeros: Vec<LayerBuffers> = layers.iter().map(LayerBuffers::zeros).collect();
        Self {
            m: zeros.clone(),
            v: zeros,
            step: 0,
            learning_rate,
        }
    }

    fn update(&mut self, layers: &mut [DenseLayer], grads: &[LayerBuffers]) {
        self.step += 1;
        let lr = self.learning_rate;
        let c1 = 1.0 - BETA1.powi(self.step);
        let c2 = 1.0 - BETA2.powi(self.step);
        let adjust = |p: &mut f64, g: f64, m: &mut f64, v: &mut f64| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            *p -= lr * (*m / c1) / ((*v / c2).sqrt() + ADAM_EPSILON);
        };

        for (((layer, grad), m), v) in layers
            .iter_mut()
            .zip(grads)
            .zip(&mut self.m)
            .zip(&mut self.v)
        {
            for o in 0..layer.output_dim() {
                for k in 0..layer.input_dim() {
                    adjust(
                        &mut layer.weights[o][k],
                        grad.weights[o][k],
                        &mut m.weights[o][k],
                        &mut v.weights[o][k],
                    );
                }
                adjust(&mut layer.bias[o], grad.bias[o], &mut m.bias[o], &mut v.bias[o]);
            }
        }
    }
}

fn init_layers(input_dim: usize, hidden: &[usize], rng: &mut StdRng) -> Vec<DenseLayer> {
    let mut widths = vec![input_dim];
    widths.extend_from_slice(hidden);
    widths.push(1);

    let last = widths.len() - 2;
    widths
        .windows(2)
        .enumerate()
        .map(|(idx, pair)| {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let (limit, activation) = if idx == last {
                ((6.0 / (fan_in + fan_out) as f64).sqrt(), Activation::Linear)
            } else {
                ((6.0 / fan_in as f64).sqrt(), Activation::Relu)
            };
            let weights = (0..fan_out)
                .map(|_| (0..fan_in).map(|_| rng.gen_range(-limit..limit)).collect())
                .collect();
            DenseLayer::new(weights, vec![0.0; fan_out], activation)
        })
        .collect()
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n).sqrt();
    let floor = 10.0 * f64::EPSILON * mean.abs().max(1.0);
    (mean, if std > floor { std } else { 1.0 })
}

/// Accumulate one sample's gradients into `grads`; returns its squared error.
fn backprop(
    layers: &[DenseLayer],
    input: &[f64],
    target: f64,
    weight: f64,
    grads: &mut [LayerBuffers],
) -> f64 {
    let mut activations = vec![input.to_vec()];
    let mut pre_activations = Vec::with_capacity(layers.len());
    for layer in layers {
        let prev = &activations[activations.len() - 1];
        let z: Vec<f64> = layer
            .weights
            .iter()
            .zip(&layer.bias)
            .map(|(row, b)| row.iter().zip(prev).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        let a = match layer.activation {
            Activation::Relu => z.iter().map(|v| v.max(0.0)).collect(),
            Activation::Linear => z.clone(),
        };
        pre_activations.push(z);
        activations.push(a);
    }

    let error = activations[layers.len()][0] - target;
    let mut delta = vec![2.0 * error * weight];

    for (l, layer) in layers.iter().enumerate().rev() {
        if layer.activation == Activation::Relu {
            for (d, z) in delta.iter_mut().zip(&pre_activations[l]) {
                if *z <= 0.0 {
                    *d = 0.0;
                }
            }
        }
        let grad = &mut grads[l];
        for (o, d) in delta.iter().enumerate() {
            grad.bias[o] += d;
            for (g, x) in grad.weights[o].iter_mut().zip(&activations[l]) {
                *g += d * x;
            }
        }
        if l > 0 {
            delta = (0..layer.input_dim())
                .map(|k| {
                    layer
                        .weights
                        .iter()
                        .zip(&delta)
                        .map(|(row, d)| row[k] * d)
                        .sum()
                })
                .collect();
        }
    }

    error * error
}

/// Fit a ReLU network to already-scaled feature rows by minimizing MSE.
pub fn fit_dense(
    rows: &[FeatureVector],
    targets: &[f64],
    config: &DenseTrainerConfig,
) -> Result<DenseNetwork> {
    config.validate()?;
    let Some(first) = rows.first() else {
        return Err(ModelError::Training("no rows to train on".to_string()));
    };
    if rows.len() != targets.len() {
        return Err(ModelError::Training(format!(
            "{} rows but {} targets",
            rows.len(),
            targets.len()
        )));
    }
    if !targets.iter().all(|y| y.is_finite()) {
        return Err(ModelError::Training("targets must be finite".to_string()));
    }

    let input_dim = first.len();
    let inputs: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            if row.len() != input_dim {
                return Err(ModelError::ShapeMismatch {
                    expected: input_dim,
                    actual: row.len(),
                });
            }
            Ok(row.clone().into_inner())
        })
        .collect::<Result<_>>()?;

    let (y_mean, y_std) = mean_and_std(targets);
    let scaled_targets: Vec<f64> = targets.iter().map(|y| (y - y_mean) / y_std).collect();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut layers = init_layers(input_dim, &config.hidden_layers, &mut rng);
    let mut adam = Adam::new(&layers, config.learning_rate);
    let mut order: Vec<usize> = (0..inputs.len()).collect();

    for epoch in 0..config.epochs {
        order.shuffle(&mut rng);
        let mut epoch_loss = 0.0;

        for batch in order.chunks(config.batch_size) {
            let mut grads: Vec<LayerBuffers> = layers.iter().map(LayerBuffers::zeros).collect();
            let weight = 1.0 / batch.len() as f64;
            for &i in batch {
                epoch_loss += backprop(&layers, &inputs[i], scaled_targets[i], weight, &mut grads);
            }
            adam.update(&mut layers, &grads);
        }

        let loss = epoch_loss / inputs.len() as f64;
        if !loss.is_finite() {
            return Err(ModelError::Training(format!(
                "loss diverged at epoch {}",
                epoch + 1
            )));
        }
        if (epoch + 1) % 50 == 0 || epoch + 1 == config.epochs {
            tracing::debug!(epoch = epoch + 1, loss, "dense training progress");
        }
    }

    // Undo target standardization in the output layer
    if let Some(output) = layers.last_mut() {
        for w in output.weights.iter_mut().flatten() {
            *w *= y_std;
        }
        for b in &mut output.bias {
            *b = *b * y_std + y_mean;
        }
    }

    DenseNetwork::new(layers).map_err(|e| ModelError::Training(e.to_string()))
}
