use crate::{
    ClassProbabilities, EcologicalZone, FireIntensity, RegionStats, RiskLabel, Season, ZoneSource,
};
use serde::{Deserialize, Serialize};

/// Narrative explanation of a prediction against the zone's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub zone: EcologicalZone,
    pub month: u8,
    pub season: Season,
    pub dominant_cause: Option<String>,
    /// Dominant cause frequency relative to all recorded causes.
    pub dominant_cause_share: Option<f64>,
    pub peak_month: Option<u8>,
    /// Frequency of `month` relative to the peak month.
    pub month_to_peak_ratio: f64,
    pub high_risk_window: Vec<u8>,
    pub within_high_risk_window: bool,
    /// The zone's share of all detections in the country.
    pub zone_share_of_detections: Option<f64>,
    /// Historical fire intensity from mean brightness and radiative power.
    pub fire_intensity: Option<FireIntensity>,
    pub narrative: String,
}

/// Everything the engine returns for one request. Never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub zone: EcologicalZone,
    pub zone_source: ZoneSource,
    pub probabilities: ClassProbabilities,
    pub predicted_label: RiskLabel,
    pub confidence: f64,
    pub insight: Insight,
    pub region_stats: RegionStats,
    pub model_version: String,
}
