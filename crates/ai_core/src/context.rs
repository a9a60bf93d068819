//! Startup-built, read-only inference state

use crate::classifier::RiskClassifier;
use crate::config::EngineConfig;
use crate::encoder::{EncoderArtifact, ZoneEncoder};
use crate::errors::ConfigError;
use crate::features::FeatureBuilder;
use crate::gbdt::Model;
use crate::insight::InsightComposer;
use crate::region_stats::{RegionStatsArtifact, RegionStatsStore};
use crate::zone::ZoneClassifier;
use forestsathi_types::BoundingBox;
use tracing::info;

/// Every component the pipeline needs. Never mutated after construction, so
/// it can be shared across threads without locking.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    pub(crate) zones: ZoneClassifier,
    pub(crate) stats: RegionStatsStore,
    pub(crate) features: FeatureBuilder,
    pub(crate) classifier: RiskClassifier,
    pub(crate) composer: InsightComposer,
}

impl InferenceContext {
    /// Read and cross-check the three artifacts named by `config`.
    pub fn load(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let artifacts = &config.artifacts;

        let encoder = EncoderArtifact::load_json(&artifacts.encoder_path)?;
        let model = Model::load_json(&artifacts.model_path)?;
        let stats = RegionStatsArtifact::load_json(&artifacts.region_stats_path)?;

        let context = Self::from_parts(
            config.bounding_box(),
            config.insight.high_risk_window_ratio,
            &encoder,
            model,
            stats,
        )?;

        if let Some(expected) = &artifacts.expected_model_hash {
            context.classifier.verify_hash(expected)?;
        }

        Ok(context)
    }

    /// Build from in-memory artifacts.
    pub fn from_parts(
        bounds: BoundingBox,
        window_ratio: f64,
        encoder: &EncoderArtifact,
        model: Model,
        stats: RegionStatsArtifact,
    ) -> Result<Self, ConfigError> {
        let zones = ZoneClassifier::new(bounds)?;
        let features = FeatureBuilder::new(ZoneEncoder::from_artifact(encoder)?);
        let classifier = RiskClassifier::new(model)?;
        classifier.check_compatibility(&features)?;

        let stats = RegionStatsStore::from_artifact(stats)?;
        let composer = InsightComposer::new(window_ratio, stats.total_detections());

        info!(
            model_version = classifier.model_version(),
            model_hash = classifier.model_hash(),
            encoder = features.encoder().fingerprint(),
            detections = stats.total_detections(),
            source = stats.source().unwrap_or("unknown"),
            "inference context ready"
        );

        Ok(Self {
            zones,
            stats,
            features,
            classifier,
            composer,
        })
    }

    pub fn zone_classifier(&self) -> &ZoneClassifier {
        &self.zones
    }

    pub fn region_stats(&self) -> &RegionStatsStore {
        &self.stats
    }

    pub fn feature_builder(&self) -> &FeatureBuilder {
        &self.features
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn composer(&self) -> &InsightComposer {
        &self.composer
    }
}
