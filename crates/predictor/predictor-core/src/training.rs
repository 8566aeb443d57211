//! Offline training pipeline
//!
//! Builds one-step-ahead samples from a chronological feed and fits the scaler
//! once on the training split. The model is either a ridge-stabilized
//! least-squares fit (a single linear layer) or a ReLU network trained with
//! Adam; both are packaged with the scaler as a [`ModelArtifact`].

use predictor_spi::{FeatureVector, ModelError, Regressor, Result, ScalerState};
use reading_spi::SensorReading;
use serde::{Deserialize, Serialize};

use crate::artifact::ModelArtifact;
use crate::dense_trainer::{fit_dense, DenseTrainerConfig};
use crate::feature::FeatureTransformer;
use crate::network::DenseNetwork;
use crate::utils::{metrics, validation};

/// Smallest training split the solver accepts.
pub const MIN_TRAINING_SAMPLES: usize = 3;

const PIVOT_EPSILON: f64 = 1e-12;

/// Training pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Version tag written into the artifact
    pub version: String,
    /// Fraction of the most recent samples held out for evaluation
    pub test_ratio: f64,
    /// L2 penalty on non-intercept coefficients of the linear fit
    pub l2_penalty: f64,
    /// ReLU network settings; `None` fits a single linear layer
    pub network: Option<DenseTrainerConfig>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            version: format!("ecosense-{}", env!("CARGO_PKG_VERSION")),
            test_ratio: 0.2,
            l2_penalty: 1e-8,
            network: None,
        }
    }
}

/// Fit quality of a freshly trained artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub train_mse: f64,
    pub test_mse: f64,
    pub test_rmse: f64,
    pub test_mae: f64,
}

/// Fit per-feature mean and population standard deviation.
///
/// Constant features get a scale of 1.0 so they map to zero instead of
/// dividing by (near) zero.
pub fn fit_scaler(rows: &[FeatureVector]) -> Result<ScalerState> {
    let Some(first) = rows.first() else {
        return Err(ModelError::Training("no rows to fit scaler on".to_string()));
    };
    let width = first.len();
    if let Some(bad) = rows.iter().find(|r| r.len() != width) {
        return Err(ModelError::ShapeMismatch {
            expected: width,
            actual: bad.len(),
        });
    }

    let n = rows.len() as f64;
    let mut mean = vec![0.0; width];
    for row in rows {
        for (m, x) in mean.iter_mut().zip(row.as_slice()) {
            *m += x;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut scale = vec![0.0; width];
    for row in rows {
        for ((s, x), m) in scale.iter_mut().zip(row.as_slice()).zip(&mean) {
            *s += (x - m).powi(2);
        }
    }
    for (s, m) in scale.iter_mut().zip(&mean) {
        let std = (*s / n).sqrt();
        // Rounding noise on a constant column is not spread
        let floor = 10.0 * f64::EPSILON * m.abs().max(1.0);
        *s = if std > floor { std } else { 1.0 };
    }

    ScalerState::new(mean, scale).map_err(|e| ModelError::Training(e.to_string()))
}

/// Train an artifact on a feed of readings.
pub fn train(
    readings: &[SensorReading],
    config: &TrainingConfig,
) -> Result<(ModelArtifact, TrainingReport)> {
    let mut ordered = readings.to_vec();
    ordered.sort_by_key(|r| r.timestamp);

    let (features, targets): (Vec<FeatureVector>, Vec<f64>) = ordered
        .windows(2)
        .map(|w| (FeatureTransformer::features(&w[0]), w[1].temperature))
        .unzip();

    let split = validation::train_test_split_index(features.len(), config.test_ratio);
    if split < MIN_TRAINING_SAMPLES || split == features.len() {
        return Err(ModelError::Training(format!(
            "need at least {} training samples plus a holdout, got {} readings",
            MIN_TRAINING_SAMPLES,
            readings.len()
        )));
    }

    let scaler = fit_scaler(&features[..split])?;
    let scaled = features[..split]
        .iter()
        .map(|f| scaler.transform(f))
        .collect::<Result<Vec<_>>>()?;

    let model = match &config.network {
        None => {
            let (bias, weights) = least_squares(&scaled, &targets[..split], config.l2_penalty)?;
            DenseNetwork::linear(weights, bias)?
        }
        Some(network) => fit_dense(&scaled, &targets[..split], network)?,
    };
    let artifact = ModelArtifact::new(config.version.clone(), scaler, model)?;

    let train_pred = predict_all(&artifact, &features[..split])?;
    let test_pred = predict_all(&artifact, &features[split..])?;
    let report = TrainingReport {
        train_samples: split,
        test_samples: features.len() - split,
        train_mse: metrics::mse(&targets[..split], &train_pred),
        test_mse: metrics::mse(&targets[split..], &test_pred),
        test_rmse: metrics::rmse(&targets[split..], &test_pred),
        test_mae: metrics::mae(&targets[split..], &test_pred),
    };

    tracing::info!(
        version = %artifact.version,
        layers = artifact.model.layers().len(),
        train_samples = report.train_samples,
        test_samples = report.test_samples,
        test_mse = report.test_mse,
        "training complete"
    );

    Ok((artifact, report))
}

fn predict_all(artifact: &ModelArtifact, rows: &[FeatureVector]) -> Result<Vec<f64>> {
    rows.iter()
        .map(|row| artifact.model.predict(&artifact.scaler.transform(row)?))
        .collect()
}

/// Solve the regularized normal equations with an intercept column.
///
/// Returns `(intercept, coefficients)`.
fn least_squares(rows: &[FeatureVector], targets: &[f64], l2: f64) -> Result<(f64, Vec<f64>)> {
    let width = rows.first().map_or(0, FeatureVector::len);
    let dim = width + 1;

    let mut a = vec![vec![0.0; dim]; dim];
    let mut b = vec![0.0; dim];
    for (row, y) in rows.iter().zip(targets) {
        let x: Vec<f64> = std::iter::once(1.0)
            .chain(row.as_slice().iter().copied())
            .collect();
        for i in 0..dim {
            b[i] += x[i] * y;
            for j in 0..dim {
                a[i][j] += x[i] * x[j];
            }
        }
    }
    for (i, row) in a.iter_mut().enumerate().skip(1) {
        row[i] += l2;
    }

    let solution = solve(a, b)?;
    Ok((solution[0], solution[1..].to_vec()))
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(ModelError::Training(
                "normal equations are singular".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
