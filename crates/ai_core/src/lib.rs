//! Wildfire risk inference engine
//!
//! Turns a resolved coordinate and a calendar month into an ecological zone,
//! a fixed-layout feature vector, class probabilities from a pre-trained
//! tree ensemble and a narrative grounded in historical detections.
//!
//! Modules:
//! - `zone`: Elevation thresholds and coordinate fallback lookup
//! - `encoder`: Training-time zone encoder and its fingerprint
//! - `region_stats`: Read-only per-zone historical statistics
//! - `features`: Fixed-point feature vector construction
//! - `gbdt`: Integer-only tree-ensemble model
//! - `classifier`: Probabilities and tie-broken label from the model
//! - `insight`: Narrative composition
//! - `context` / `service`: Startup-built state and the request pipeline
//! - `config`: TOML configuration with environment overrides
//! - `fixtures`: Reference artifacts for tests and benchmarks

pub mod classifier;
pub mod config;
pub mod context;
pub mod encoder;
pub mod errors;
pub mod features;
pub mod fixtures;
pub mod gbdt;
pub mod insight;
pub mod region_stats;
pub mod serde_canon;
pub mod service;
pub mod zone;

pub use classifier::RiskClassifier;
pub use config::EngineConfig;
pub use context::InferenceContext;
pub use encoder::{EncoderArtifact, ZoneEncoder};
pub use errors::{ConfigError, ErrorKind, Result, RiskError};
pub use features::{FeatureBuilder, FeatureVector, FEATURE_LAYOUT, FEATURE_SCALE};
pub use gbdt::{Model, Node, Tree};
pub use insight::InsightComposer;
pub use region_stats::{RegionStatsArtifact, RegionStatsStore, ZoneSummary};
pub use service::PredictionService;
pub use zone::ZoneClassifier;

/// Crate version string for reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load configuration and artifacts from `config_path` and build a service.
pub fn service_from_config<P: AsRef<std::path::Path>>(
    config_path: P,
) -> std::result::Result<(EngineConfig, PredictionService), ConfigError> {
    let config = EngineConfig::load(config_path)?;
    let context = InferenceContext::load(&config)?;
    Ok((config, PredictionService::new(context)))
}
