//! Reference artifacts
//!
//! A small, internally consistent encoder, model and region-statistics set.
//! Tests and benchmarks build contexts from these; the files under
//! `artifacts/` at the workspace root hold the same data.

use crate::config::EngineConfig;
use crate::context::InferenceContext;
use crate::encoder::{EncoderArtifact, ZoneEncoder, ENCODER_SCHEMA_VERSION};
use crate::errors::ConfigError;
use crate::features::feature_layout;
use crate::gbdt::{Model, Node, Tree, MODEL_SCHEMA_VERSION, SCALE};
use crate::region_stats::{RegionStatsArtifact, REGION_STATS_SCHEMA_VERSION};
use crate::serde_canon::to_canonical_json;
use forestsathi_types::{BoundingBox, CauseFrequency, RegionStats};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MODEL_VERSION: &str = "2024.03-reference";

/// Fingerprint of [`encoder_artifact`]
pub const ENCODER_FINGERPRINT: &str =
    "29c2c95c1e1ebeadfc172d7a624891e8a723f3aaad0e0bf6c1103a69e1023315";

/// Label-encoder order of the training-time region names.
pub fn encoder_artifact() -> EncoderArtifact {
    EncoderArtifact {
        schema_version: ENCODER_SCHEMA_VERSION,
        classes: vec![
            "High Himalayas".to_string(),
            "Mahabharat Range (Hills)".to_string(),
            "Terai Plains".to_string(),
        ],
    }
}

pub fn zone_encoder() -> Result<ZoneEncoder, ConfigError> {
    ZoneEncoder::from_artifact(&encoder_artifact())
}

/// Three-tree ensemble over the standard feature layout.
///
/// Classes are stored alphabetically (`High`, `Low`, `Moderate`); leaves
/// follow that order.
pub fn model() -> Model {
    // Seasonal signal: months near the zone's peak lean High.
    let seasonal = Tree::new(
        vec![
            Node::internal(0, 3, 300_000, 1, 2),
            Node::leaf(1, vec![50_000, 800_000, 150_000]),
            Node::internal(2, 2, 150_000, 3, 4),
            Node::leaf(3, vec![250_000, 200_000, 550_000]),
            Node::leaf(4, vec![700_000, 50_000, 250_000]),
        ],
        SCALE,
    );

    // National calendar: March to June is fire season.
    let calendar = Tree::new(
        vec![
            Node::internal(0, 1, 2_500_000, 1, 2),
            Node::leaf(1, vec![100_000, 600_000, 300_000]),
            Node::internal(2, 1, 6_500_000, 3, 4),
            Node::leaf(3, vec![600_000, 100_000, 300_000]),
            Node::leaf(4, vec![50_000, 750_000, 200_000]),
        ],
        SCALE / 2,
    );

    // Zone history: code 0 is the Himalaya in the reference encoder.
    let history = Tree::new(
        vec![
            Node::internal(0, 0, 500_000, 1, 2),
            Node::leaf(1, vec![300_000, 250_000, 450_000]),
            Node::internal(2, 4, 50_000 * SCALE, 3, 4),
            Node::leaf(3, vec![200_000, 350_000, 450_000]),
            Node::leaf(4, vec![450_000, 200_000, 350_000]),
        ],
        SCALE / 2,
    );

    Model {
        schema_version: MODEL_SCHEMA_VERSION,
        model_version: MODEL_VERSION.to_string(),
        scale: SCALE,
        feature_names: feature_layout(),
        classes: vec!["High".to_string(), "Low".to_string(), "Moderate".to_string()],
        encoder_fingerprint: ENCODER_FINGERPRINT.to_string(),
        trees: vec![seasonal, calendar, history],
    }
}

fn causes(entries: &[(&str, f64)]) -> Vec<CauseFrequency> {
    entries
        .iter()
        .map(|&(cause, frequency)| CauseFrequency {
            cause: cause.to_string(),
            frequency,
        })
        .collect()
}

fn months(frequencies: [f64; 12]) -> BTreeMap<u8, f64> {
    (1u8..=12).zip(frequencies).collect()
}

/// Aggregates shaped like the 2012-2023 detection archive (189,542
/// detections).
pub fn region_stats_artifact() -> RegionStatsArtifact {
    let terai = RegionStats {
        total_historical_fires: 104_250,
        dominant_causes: causes(&[
            ("agricultural/grassland burning", 0.46),
            ("forest understory fires", 0.28),
            ("roadside and settlement fires", 0.16),
            ("unattributed", 0.10),
        ]),
        seasonal_distribution: months([
            0.02, 0.08, 0.27, 0.33, 0.19, 0.04, 0.005, 0.005, 0.005, 0.01, 0.015, 0.02,
        ]),
        avg_brightness_k: Some(327.4),
        avg_frp_mw: Some(11.8),
    };

    let mahabharat = RegionStats {
        total_historical_fires: 71_380,
        dominant_causes: causes(&[
            ("dry pine needle accumulation", 0.41),
            ("terrace clearing fires", 0.27),
            ("grazing fires", 0.19),
            ("unattributed", 0.13),
        ]),
        seasonal_distribution: months([
            0.015, 0.05, 0.17, 0.30, 0.26, 0.12, 0.01, 0.005, 0.005, 0.015, 0.02, 0.03,
        ]),
        avg_brightness_k: Some(322.9),
        avg_frp_mw: Some(9.6),
    };

    let himalaya = RegionStats {
        total_historical_fires: 13_912,
        dominant_causes: causes(&[
            ("natural dry shrubs and high winds", 0.52),
            ("pasture burning", 0.31),
            ("campfires", 0.17),
        ]),
        seasonal_distribution: months([
            0.01, 0.04, 0.24, 0.34, 0.22, 0.05, 0.005, 0.005, 0.01, 0.02, 0.025, 0.03,
        ]),
        avg_brightness_k: Some(316.2),
        avg_frp_mw: Some(7.1),
    };

    RegionStatsArtifact {
        schema_version: REGION_STATS_SCHEMA_VERSION,
        source: Some("VIIRS/MODIS active fire detections, Nepal, 2012-2023".to_string()),
        zones: BTreeMap::from([
            ("Terai Plains".to_string(), terai),
            ("Mahabharat Range (Hills)".to_string(), mahabharat),
            ("High Himalayas".to_string(), himalaya),
        ]),
    }
}

/// Context over the reference artifacts with default bounds and ratio.
pub fn context() -> Result<InferenceContext, ConfigError> {
    InferenceContext::from_parts(
        BoundingBox::NEPAL,
        crate::insight::DEFAULT_WINDOW_RATIO,
        &encoder_artifact(),
        model(),
        region_stats_artifact(),
    )
}

/// Write the reference artifacts and a config pointing at them into `dir`;
/// returns the config file path.
pub fn write_artifacts(dir: &Path) -> Result<std::path::PathBuf, ConfigError> {
    let write = |name: &str, json: String| -> Result<(), ConfigError> {
        let path = dir.join(name);
        fs::write(&path, json).map_err(|source| ConfigError::Io { path, source })
    };

    write("encoder.json", to_canonical_json(&encoder_artifact())?)?;
    write("model.json", to_canonical_json(&model())?)?;
    write("region_stats.json", to_canonical_json(&region_stats_artifact())?)?;

    let mut config = EngineConfig::default();
    config.artifacts.encoder_path = "encoder.json".into();
    config.artifacts.model_path = "model.json".into();
    config.artifacts.region_stats_path = "region_stats.json".into();
    config.artifacts.expected_model_hash = Some(model().hash_hex()?);

    let toml = toml::to_string(&config)
        .map_err(|e| ConfigError::Invalid(format!("cannot render config: {e}")))?;
    let path = dir.join("forestsathi.toml");
    fs::write(&path, toml).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
