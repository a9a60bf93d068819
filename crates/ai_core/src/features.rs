//! Feature vector construction
//!
//! All features are fixed-point integers at [`FEATURE_SCALE`]. The layout is
//! part of the contract with the model artifact: `feature_names` must equal
//! [`FEATURE_LAYOUT`] or the model is rejected at load.

use crate::encoder::ZoneEncoder;
use crate::errors::{Result, RiskError};
use forestsathi_types::{is_valid_month, EcologicalZone, RegionStats};
use serde::{Deserialize, Serialize};

/// Fixed-point scale of every feature (1e6)
pub const FEATURE_SCALE: i64 = 1_000_000;

/// Feature order:
/// 0. Encoded zone code
/// 1. Calendar month (1-12)
/// 2. Share of the zone's yearly fires falling in the month
/// 3. Month frequency relative to the zone's peak month
/// 4. Historical detections in the zone
pub const FEATURE_LAYOUT: [&str; 5] = [
    "zone_code",
    "month",
    "seasonal_share",
    "peak_ratio",
    "historical_fires",
];

pub fn feature_layout() -> Vec<String> {
    FEATURE_LAYOUT.iter().map(|name| name.to_string()).collect()
}

/// Fixed-order feature values plus the encoder they were built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<i64>,
    encoder_fingerprint: String,
}

impl FeatureVector {
    /// Raw constructor, mainly for feeding hand-made vectors to a classifier.
    pub fn from_parts(values: Vec<i64>, encoder_fingerprint: impl Into<String>) -> Self {
        Self {
            values,
            encoder_fingerprint: encoder_fingerprint.into(),
        }
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn encoder_fingerprint(&self) -> &str {
        &self.encoder_fingerprint
    }
}

/// Builds [`FeatureVector`]s with the training-time zone encoder.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    encoder: ZoneEncoder,
}

impl FeatureBuilder {
    pub fn new(encoder: ZoneEncoder) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &ZoneEncoder {
        &self.encoder
    }

    pub fn layout(&self) -> &'static [&'static str] {
        &FEATURE_LAYOUT
    }

    /// Historical features are zero when `stats` is `None`.
    pub fn build(
        &self,
        zone: EcologicalZone,
        month: u8,
        stats: Option<&RegionStats>,
    ) -> Result<FeatureVector> {
        if !is_valid_month(month) {
            return Err(RiskError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }

        let zone_code = i64::from(self.encoder.encode(zone)) * FEATURE_SCALE;
        let month_value = i64::from(month) * FEATURE_SCALE;

        let (seasonal_share, peak_ratio, historical_fires) = match stats {
            Some(stats) => (
                to_fixed(stats.seasonal_share(month)),
                to_fixed(stats.peak_ratio(month)),
                i64::try_from(stats.total_historical_fires)
                    .ok()
                    .and_then(|fires| fires.checked_mul(FEATURE_SCALE))
                    .unwrap_or(i64::MAX),
            ),
            None => (0, 0, 0),
        };

        Ok(FeatureVector {
            values: vec![zone_code, month_value, seasonal_share, peak_ratio, historical_fires],
            encoder_fingerprint: self.encoder.fingerprint().to_string(),
        })
    }

    /// Recover the zone from a vector built with the same encoder.
    pub fn decode_zone(&self, vector: &FeatureVector) -> Option<EcologicalZone> {
        if vector.encoder_fingerprint != self.encoder.fingerprint() {
            return None;
        }
        let slot = *vector.values.first()?;
        if slot % FEATURE_SCALE != 0 {
            return None;
        }
        self.encoder.decode(u32::try_from(slot / FEATURE_SCALE).ok()?)
    }
}

/// Fraction to fixed point, rounding half away from zero. Inputs are
/// finite ratios in `[0, 1]`.
fn to_fixed(value: f64) -> i64 {
    if value.is_finite() {
        (value * FEATURE_SCALE as f64).round() as i64
    } else {
        0
    }
}
