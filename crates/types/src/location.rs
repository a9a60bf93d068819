use core::fmt;
use serde::{Deserialize, Serialize};

/// A resolved point inside the supported country, created per request.
///
/// Elevation is optional: callers that only have coordinates leave it empty
/// and the zone classifier falls back to its coordinate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: None,
        }
    }

    pub fn with_elevation(latitude: f64, longitude: f64, elevation_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: Some(elevation_m),
        }
    }

    /// True when both coordinates are finite numbers.
    pub fn has_finite_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Geographic extent in decimal degrees. All edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Extent of Nepal used by the training data.
    pub const NEPAL: BoundingBox = BoundingBox {
        min_latitude: 26.3,
        max_latitude: 30.5,
        min_longitude: 80.0,
        max_longitude: 88.2,
    };

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    /// Edges are finite and ordered.
    pub fn is_well_formed(&self) -> bool {
        [
            self.min_latitude,
            self.max_latitude,
            self.min_longitude,
            self.max_longitude,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.min_latitude <= self.max_latitude
            && self.min_longitude <= self.max_longitude
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::NEPAL
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat {}..={}, lon {}..={}",
            self.min_latitude, self.max_latitude, self.min_longitude, self.max_longitude
        )
    }
}
