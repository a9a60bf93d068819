//! ForestSathi command line interface
//!
//! Loads the configured artifacts and answers wildfire risk questions for a
//! coordinate inside Nepal.

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use forestsathi_ai_core::config::{EngineConfig, DEFAULT_CONFIG_PATH};
use forestsathi_ai_core::{
    EncoderArtifact, InferenceContext, Model, PredictionService, RegionStatsStore, RiskError,
    ZoneClassifier, ZoneEncoder,
};
use forestsathi_types::{month_name, Location, PredictionResult, ZoneSource};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forestsathi")]
#[command(about = "Wildfire risk prediction for Nepal", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict fire risk for a location and month
    Predict(PredictCommand),
    /// Show the ecological zone of a location
    Zone(PointArgs),
    /// National summary of historical detections per zone
    Stats,
    /// Print the model hash or encoder fingerprint of an artifact
    Fingerprint(FingerprintCommand),
}

#[derive(Args)]
struct PointArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Elevation in metres, when known
    #[arg(long, allow_hyphen_values = true)]
    elevation: Option<f64>,
}

impl PointArgs {
    fn location(&self) -> Location {
        match self.elevation {
            Some(elevation) => Location::with_elevation(self.lat, self.lon, elevation),
            None => Location::new(self.lat, self.lon),
        }
    }
}

#[derive(Args)]
struct PredictCommand {
    #[command(flatten)]
    point: PointArgs,
    /// Calendar month 1-12 (defaults to the current month)
    #[arg(long)]
    month: Option<u8>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FingerprintCommand {
    /// Model artifact
    #[arg(long)]
    model: Option<PathBuf>,
    /// Encoder artifact
    #[arg(long)]
    encoder: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

/// 2 when the caller can fix the request, 1 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RiskError>() {
        Some(risk) if risk.is_recoverable() => 2,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Fingerprint(cmd) = &cli.command {
        init_logging("warn");
        return handle_fingerprint(cmd);
    }

    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    init_logging(&config.logging.level);
    debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Predict(cmd) => handle_predict(cmd, &config),
        Commands::Zone(point) => handle_zone(&point, &config),
        Commands::Stats => handle_stats(&config),
        Commands::Fingerprint(_) => Ok(()),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_predict(cmd: PredictCommand, config: &EngineConfig) -> Result<()> {
    let context = InferenceContext::load(config).context("failed to load inference artifacts")?;
    let service = PredictionService::new(context);

    let month = cmd
        .month
        .unwrap_or_else(|| chrono::Local::now().month() as u8);
    let result = service.predict(&cmd.point.location(), month)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_prediction(&result);
    }

    Ok(())
}

fn print_prediction(result: &PredictionResult) {
    println!(
        "{} risk in the {} zone ({}, {:.1}% confidence)",
        result.predicted_label,
        result.zone,
        month_name(result.insight.month).unwrap_or("?"),
        result.confidence * 100.0
    );
    for (label, probability) in result.probabilities.iter() {
        println!("  {label:<9} {:>6.2}%", probability * 100.0);
    }
    println!();
    println!("{}", result.insight.narrative);
    println!();
    println!(
        "zone source: {}, model: {}",
        source_name(result.zone_source),
        result.model_version
    );
}

fn handle_zone(point: &PointArgs, config: &EngineConfig) -> Result<()> {
    let classifier = ZoneClassifier::new(config.bounding_box())?;
    let (zone, source) = classifier.assign(&point.location())?;

    println!("{zone} ({})", zone.elevation_band());
    println!("source: {}", source_name(source));
    Ok(())
}

fn handle_stats(config: &EngineConfig) -> Result<()> {
    let path = &config.artifacts.region_stats_path;
    let store = RegionStatsStore::load_json(path)
        .with_context(|| format!("failed to load region statistics {}", path.display()))?;

    if let Some(source) = store.source() {
        println!("Source: {source}");
    }
    println!("Total detections: {}", store.total_detections());
    println!();

    for row in store.summary() {
        println!("{} ({})", row.zone, row.zone.elevation_band());
        println!("  fires:          {}", row.total_fires);
        if let Some(share) = row.share_of_detections {
            println!("  national share: {:.1}%", share * 100.0);
        }
        if let Some(month) = row.peak_month.and_then(month_name) {
            println!("  peak month:     {month}");
        }
        if let Some(cause) = &row.dominant_cause {
            println!("  main cause:     {cause}");
        }
        if let Some(brightness) = row.avg_brightness_k {
            println!("  brightness:     {brightness:.1} K");
        }
        if let Some(frp) = row.avg_frp_mw {
            println!("  radiative power: {frp:.1} MW");
        }
    }

    Ok(())
}

fn handle_fingerprint(cmd: &FingerprintCommand) -> Result<()> {
    if let Some(path) = &cmd.model {
        let model = Model::load_json(path)
            .with_context(|| format!("failed to load model {}", path.display()))?;
        println!("{}", model.hash_hex()?);
    }
    if let Some(path) = &cmd.encoder {
        let artifact = EncoderArtifact::load_json(path)
            .with_context(|| format!("failed to load encoder {}", path.display()))?;
        println!("{}", ZoneEncoder::from_artifact(&artifact)?.fingerprint());
    }
    Ok(())
}

fn source_name(source: ZoneSource) -> &'static str {
    match source {
        ZoneSource::Elevation => "elevation",
        ZoneSource::CoordinateLookup => "coordinate lookup",
    }
}
