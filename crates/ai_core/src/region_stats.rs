//! Read-only historical statistics per ecological zone

use crate::errors::ConfigError;
use forestsathi_types::{is_valid_month, EcologicalZone, RegionStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const REGION_STATS_SCHEMA_VERSION: u32 = 1;

const ARTIFACT: &str = "region statistics";

/// Region-statistics artifact as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStatsArtifact {
    pub schema_version: u32,
    /// Provenance of the aggregates (detection archive, date range).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub zones: BTreeMap<String, RegionStats>,
}

impl RegionStatsArtifact {
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// One row of the national summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub zone: EcologicalZone,
    pub total_fires: u64,
    pub share_of_detections: Option<f64>,
    pub avg_brightness_k: Option<f64>,
    pub avg_frp_mw: Option<f64>,
    pub peak_month: Option<u8>,
    pub dominant_cause: Option<String>,
}

/// Immutable per-zone lookup, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStatsStore {
    /// Indexed by `EcologicalZone::index()`.
    stats: Vec<RegionStats>,
    source: Option<String>,
}

impl RegionStatsStore {
    pub fn from_artifact(artifact: RegionStatsArtifact) -> Result<Self, ConfigError> {
        if artifact.schema_version != REGION_STATS_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema {
                artifact: ARTIFACT,
                found: artifact.schema_version,
                expected: REGION_STATS_SCHEMA_VERSION,
            });
        }

        let mut slots: [Option<RegionStats>; 3] = [None, None, None];
        for (name, mut stats) in artifact.zones {
            let zone: EcologicalZone = name.parse().map_err(|source| ConfigError::UnknownZone {
                artifact: ARTIFACT,
                source,
            })?;
            validate_stats(zone, &stats)?;
            stats.sort_causes();

            let slot = &mut slots[zone.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateZone {
                    artifact: ARTIFACT,
                    zone: zone.to_string(),
                });
            }
            *slot = Some(stats);
        }

        let mut stats = Vec::with_capacity(EcologicalZone::ALL.len());
        for zone in EcologicalZone::ALL {
            let entry = slots[zone.index()]
                .take()
                .ok_or_else(|| ConfigError::MissingZone {
                    artifact: ARTIFACT,
                    zone: zone.to_string(),
                })?;
            stats.push(entry);
        }

        Ok(Self {
            stats,
            source: artifact.source,
        })
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_artifact(RegionStatsArtifact::load_json(path)?)
    }

    pub fn stats_for(&self, zone: EcologicalZone) -> &RegionStats {
        &self.stats[zone.index()]
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Detections across all zones.
    pub fn total_detections(&self) -> u64 {
        self.stats
            .iter()
            .map(|s| s.total_historical_fires)
            .fold(0u64, u64::saturating_add)
    }

    /// Zone's fraction of national detections; `None` when there are none.
    pub fn zone_share(&self, zone: EcologicalZone) -> Option<f64> {
        let total = self.total_detections();
        if total == 0 {
            return None;
        }
        Some(self.stats_for(zone).total_historical_fires as f64 / total as f64)
    }

    pub fn summary(&self) -> Vec<ZoneSummary> {
        EcologicalZone::ALL
            .into_iter()
            .map(|zone| {
                let stats = self.stats_for(zone);
                ZoneSummary {
                    zone,
                    total_fires: stats.total_historical_fires,
                    share_of_detections: self.zone_share(zone),
                    avg_brightness_k: stats.avg_brightness_k,
                    avg_frp_mw: stats.avg_frp_mw,
                    peak_month: stats.peak_month(),
                    dominant_cause: stats.dominant_cause().map(|c| c.cause.clone()),
                }
            })
            .collect()
    }
}

fn validate_stats(zone: EcologicalZone, stats: &RegionStats) -> Result<(), ConfigError> {
    for (&month, &frequency) in &stats.seasonal_distribution {
        if !is_valid_month(month) {
            return Err(ConfigError::invalid(
                ARTIFACT,
                format!("{zone}: month {month} outside 1-12"),
            ));
        }
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(ConfigError::invalid(
                ARTIFACT,
                format!("{zone}: month {month} has invalid frequency {frequency}"),
            ));
        }
    }

    for cause in &stats.dominant_causes {
        if !cause.frequency.is_finite() || cause.frequency < 0.0 {
            return Err(ConfigError::invalid(
                ARTIFACT,
                format!("{zone}: cause '{}' has invalid frequency {}", cause.cause, cause.frequency),
            ));
        }
    }

    for value in [stats.avg_brightness_k, stats.avg_frp_mw].into_iter().flatten() {
        if !value.is_finite() {
            return Err(ConfigError::invalid(
                ARTIFACT,
                format!("{zone}: non-finite detection average"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn lookup_by_zone() {
        let store = RegionStatsStore::from_artifact(fixtures::region_stats_artifact()).unwrap();
        for zone in EcologicalZone::ALL {
            assert!(store.stats_for(zone).total_historical_fires > 0);
        }
        let terai = store.stats_for(EcologicalZone::Terai);
        assert_eq!(
            terai.dominant_cause().unwrap().cause,
            "agricultural/grassland burning"
        );
    }

    #[test]
    fn causes_are_sorted_at_load() {
        let mut artifact = fixtures::region_stats_artifact();
        for stats in artifact.zones.values_mut() {
            stats.dominant_causes.reverse();
        }
        let store = RegionStatsStore::from_artifact(artifact).unwrap();
        for zone in EcologicalZone::ALL {
            let causes = &store.stats_for(zone).dominant_causes;
            assert!(causes.windows(2).all(|w| w[0].frequency >= w[1].frequency));
        }
    }

    #[test]
    fn national_shares() {
        let store = RegionStatsStore::from_artifact(fixtures::region_stats_artifact()).unwrap();
        let total: f64 = EcologicalZone::ALL
            .into_iter()
            .filter_map(|z| store.zone_share(z))
            .sum();
        assert!((total - 1.0).abs() < 1e-12);

        let summary = store.summary();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].zone, EcologicalZone::Terai);
        assert_eq!(
            summary.iter().map(|s| s.total_fires).sum::<u64>(),
            store.total_detections()
        );
    }

    #[test]
    fn missing_zone_is_fatal() {
        let mut artifact = fixtures::region_stats_artifact();
        artifact.zones.retain(|name, _| name != "High Himalayas");
        assert!(matches!(
            RegionStatsStore::from_artifact(artifact),
            Err(ConfigError::MissingZone { .. })
        ));
    }

    #[test]
    fn duplicate_spellings_are_fatal() {
        let mut artifact = fixtures::region_stats_artifact();
        let terai = artifact.zones["Terai Plains"].clone();
        artifact.zones.insert("terai".to_string(), terai);
        assert!(matches!(
            RegionStatsStore::from_artifact(artifact),
            Err(ConfigError::DuplicateZone { .. })
        ));
    }

    #[test]
    fn rejects_bad_months_and_frequencies() {
        let mut artifact = fixtures::region_stats_artifact();
        artifact
            .zones
            .get_mut("Terai Plains")
            .unwrap()
            .seasonal_distribution
            .insert(13, 0.1);
        assert!(RegionStatsStore::from_artifact(artifact).is_err());

        let mut artifact = fixtures::region_stats_artifact();
        artifact
            .zones
            .get_mut("Terai Plains")
            .unwrap()
            .seasonal_distribution
            .insert(4, -0.5);
        assert!(RegionStatsStore::from_artifact(artifact).is_err());

        let mut artifact = fixtures::region_stats_artifact();
        artifact.schema_version = 0;
        assert!(matches!(
            RegionStatsStore::from_artifact(artifact),
            Err(ConfigError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn zero_detections_have_no_share() {
        let mut artifact = fixtures::region_stats_artifact();
        for stats in artifact.zones.values_mut() {
            stats.total_historical_fires = 0;
        }
        let store = RegionStatsStore::from_artifact(artifact).unwrap();
        assert_eq!(store.zone_share(EcologicalZone::Terai), None);
    }
}
