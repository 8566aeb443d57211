//! # ecosense
//!
//! Command-line tools for the forecast model: train an artifact from a CSV
//! export of readings, run a one-off prediction, or inspect an artifact.

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use predictor_facade::prelude::*;
use predictor_facade::{train, FEATURE_NAMES};
use reading_facade::SensorReading;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliResult<T> = std::result::Result<T, String>;

/// Timestamp layout used by CSV exports of the readings table.
const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "ecosense")]
#[command(about = "Sensor forecast model tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the scaler and regressor on historical readings
    Train {
        /// CSV file with timestamp, temperature, humidity columns
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the artifact
        #[arg(short, long, default_value = "./model/artifact.json")]
        output: PathBuf,

        /// Version tag stored in the artifact
        #[arg(long)]
        version: Option<String>,

        /// Fraction of the newest samples held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_ratio: f64,

        /// ReLU hidden layer widths, e.g. 64,32,16 (omit for a linear fit)
        #[arg(long, value_delimiter = ',')]
        hidden: Vec<usize>,

        /// Training epochs for the ReLU network
        #[arg(long, default_value = "150")]
        epochs: usize,

        /// Mini-batch size for the ReLU network
        #[arg(long, default_value = "16")]
        batch_size: usize,

        /// Adam learning rate for the ReLU network
        #[arg(long, default_value = "0.001")]
        learning_rate: f64,

        /// Seed for weight initialization and shuffling
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Forecast the next hour for a single reading
    Predict {
        /// Artifact produced by `train`
        #[arg(short, long)]
        artifact: PathBuf,

        /// Temperature in °C
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: f64,

        /// Reading time, "YYYY-MM-DD HH:MM:SS" (UTC) or RFC 3339
        #[arg(long)]
        timestamp: String,
    },

    /// Print an artifact's version, layers and scaler statistics
    Inspect {
        #[arg(short, long)]
        artifact: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct CsvReading {
    timestamp: String,
    temperature: f64,
    humidity: f64,
}

fn parse_timestamp(value: &str) -> CliResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, CSV_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("Invalid timestamp '{}': {}", value, e))
}

/// Load readings from a CSV file with a header row
fn load_readings(path: &Path) -> CliResult<Vec<SensorReading>> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let mut readings = Vec::new();
    for (line, result) in reader.deserialize::<CsvReading>().enumerate() {
        // Header is line 1
        let record = result.map_err(|e| format!("Failed to read record {}: {}", line + 2, e))?;
        let timestamp = parse_timestamp(&record.timestamp)?;
        readings.push(SensorReading::new(record.temperature, record.humidity, timestamp));
    }

    if readings.is_empty() {
        return Err(format!("No readings found in {:?}", path));
    }
    Ok(readings)
}

/// Run train command
fn run_train(input: &Path, output: &Path, config: TrainingConfig) -> CliResult<TrainingReport> {
    let readings = load_readings(input)?;
    println!(
        "Loaded {} readings from {:?}",
        readings.len(),
        input.file_name().unwrap_or_default()
    );

    let (artifact, report) = train(&readings, &config).map_err(|e| e.to_string())?;
    artifact.save(output).map_err(|e| e.to_string())?;

    println!("Artifact {} written to {:?}", artifact.version, output);
    println!(
        "Train samples: {}  Test samples: {}",
        report.train_samples, report.test_samples
    );
    println!(
        "Train MSE: {:.4}  Test MSE: {:.4}  Test RMSE: {:.4}  Test MAE: {:.4}",
        report.train_mse, report.test_mse, report.test_rmse, report.test_mae
    );
    Ok(report)
}

/// Run predict command
fn run_predict(artifact: &Path, temperature: f64, timestamp: &str) -> CliResult<ForecastResult> {
    let artifact = ModelArtifact::load(artifact).map_err(|e| e.to_string())?;
    let reading = SensorReading::new(temperature, 0.0, parse_timestamp(timestamp)?);

    let result = Forecaster::new(Arc::new(artifact))
        .forecast(&reading)
        .map_err(|e| e.to_string())?;

    let json = serde_json::json!({
        "predicted_temperature": result.predicted_temperature,
        "timestamp": result.forecast_timestamp.format(CSV_TIMESTAMP_FORMAT).to_string(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
    );
    Ok(result)
}

/// Run inspect command
fn run_inspect(artifact: &Path) -> CliResult<()> {
    let artifact = ModelArtifact::load(artifact).map_err(|e| e.to_string())?;

    println!("Version: {}", artifact.version);
    println!("Model: {} ({} inputs)", artifact.model.name(), artifact.model.input_dim());
    for (i, layer) in artifact.model.layers().iter().enumerate() {
        println!(
            "  Layer {}: {} -> {} ({:?})",
            i + 1,
            layer.input_dim(),
            layer.output_dim(),
            layer.activation
        );
    }
    println!("Scaler:");
    let scaler = &artifact.scaler;
    for ((name, mean), scale) in FEATURE_NAMES.iter().zip(scaler.mean()).zip(scaler.scale()) {
        println!("  {:<12} mean={:.6} scale={:.6}", name, mean, scale);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            input,
            output,
            version,
            test_ratio,
            hidden,
            epochs,
            batch_size,
            learning_rate,
            seed,
        } => {
            let network = (!hidden.is_empty()).then(|| DenseTrainerConfig {
                hidden_layers: hidden,
                epochs,
                batch_size,
                learning_rate,
                seed,
            });
            let mut config = TrainingConfig {
                test_ratio,
                network,
                ..TrainingConfig::default()
            };
            if let Some(version) = version {
                config.version = version;
            }
            run_train(&input, &output, config).map(|_| ())
        }

        Commands::Predict {
            artifact,
            temperature,
            timestamp,
        } => run_predict(&artifact, temperature, &timestamp).map(|_| ()),

        Commands::Inspect { artifact } => run_inspect(&artifact),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
