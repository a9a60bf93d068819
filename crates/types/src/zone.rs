use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Ecological elevation band.
///
/// Variants are declared lowest band first so the derived ordering is the
/// elevation order: `Terai < Mahabharat < Himalaya`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EcologicalZone {
    Terai,
    Mahabharat,
    Himalaya,
}

impl EcologicalZone {
    pub const ALL: [EcologicalZone; 3] = [
        EcologicalZone::Terai,
        EcologicalZone::Mahabharat,
        EcologicalZone::Himalaya,
    ];

    /// Dense index in `0..3`, following the elevation order.
    pub const fn index(self) -> usize {
        match self {
            EcologicalZone::Terai => 0,
            EcologicalZone::Mahabharat => 1,
            EcologicalZone::Himalaya => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EcologicalZone::Terai => "Terai",
            EcologicalZone::Mahabharat => "Mahabharat",
            EcologicalZone::Himalaya => "Himalaya",
        }
    }

    /// Region name used by the training pipeline.
    pub const fn training_name(self) -> &'static str {
        match self {
            EcologicalZone::Terai => "Terai Plains",
            EcologicalZone::Mahabharat => "Mahabharat Range (Hills)",
            EcologicalZone::Himalaya => "High Himalayas",
        }
    }

    /// Human-readable elevation band.
    pub const fn elevation_band(self) -> &'static str {
        match self {
            EcologicalZone::Terai => "below 500 m",
            EcologicalZone::Mahabharat => "500 m to 3,000 m",
            EcologicalZone::Himalaya => "above 3,000 m",
        }
    }
}

impl fmt::Display for EcologicalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ecological zone '{0}'")]
pub struct UnknownZone(pub String);

impl FromStr for EcologicalZone {
    type Err = UnknownZone;

    /// Accepts the canonical names, the short lowercase names and the
    /// training-time region names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terai" | "terai plains" => Ok(EcologicalZone::Terai),
            "mahabharat" | "hills" | "mahabharat range (hills)" | "mahabharat range" => {
                Ok(EcologicalZone::Mahabharat)
            }
            "himalaya" | "himalayas" | "high himalayas" => Ok(EcologicalZone::Himalaya),
            _ => Err(UnknownZone(s.to_string())),
        }
    }
}

/// How a location's zone was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    /// Fixed elevation thresholds.
    Elevation,
    /// Longitude-banded latitude lookup, used when elevation is unknown.
    CoordinateLookup,
}
