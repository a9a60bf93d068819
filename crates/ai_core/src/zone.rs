//! Ecological zone assignment
//!
//! Known elevations use fixed thresholds. Without an elevation the zone is
//! approximated from a longitude-banded latitude table calibrated against the
//! district zone records used at training time.

use crate::errors::{ConfigError, Result, RiskError};
use forestsathi_types::{BoundingBox, EcologicalZone, Location, ZoneSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Upper bound (exclusive) of the Terai band, metres
pub const TERAI_MAX_ELEVATION_M: f64 = 500.0;

/// Upper bound (inclusive) of the Mahabharat band, metres
pub const MAHABHARAT_MAX_ELEVATION_M: f64 = 3000.0;

/// Zone for a known elevation: `[-inf, 500)` Terai, `[500, 3000]`
/// Mahabharat, `(3000, inf)` Himalaya. `None` for non-finite input.
pub fn zone_for_elevation(elevation_m: f64) -> Option<EcologicalZone> {
    if !elevation_m.is_finite() {
        return None;
    }
    let zone = if elevation_m < TERAI_MAX_ELEVATION_M {
        EcologicalZone::Terai
    } else if elevation_m <= MAHABHARAT_MAX_ELEVATION_M {
        EcologicalZone::Mahabharat
    } else {
        EcologicalZone::Himalaya
    };
    Some(zone)
}

/// One longitude band of the coordinate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatitudeBand {
    pub lon_min: f64,
    pub lon_max: f64,
    /// Latitudes strictly below this are Terai.
    pub terai_below_lat: f64,
    /// Latitudes at or above this are Himalaya.
    pub himalaya_from_lat: f64,
}

impl LatitudeBand {
    const fn new(lon_min: f64, lon_max: f64, terai_below_lat: f64, himalaya_from_lat: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            terai_below_lat,
            himalaya_from_lat,
        }
    }

    fn zone_at(&self, latitude: f64) -> EcologicalZone {
        if latitude < self.terai_below_lat {
            EcologicalZone::Terai
        } else if latitude >= self.himalaya_from_lat {
            EcologicalZone::Himalaya
        } else {
            EcologicalZone::Mahabharat
        }
    }

    fn distance(&self, longitude: f64) -> f64 {
        if longitude < self.lon_min {
            self.lon_min - longitude
        } else if longitude > self.lon_max {
            longitude - self.lon_max
        } else {
            0.0
        }
    }
}

/// West-to-east bands. The foothills and the high range both sit further
/// south towards the east of the country.
pub const DEFAULT_BANDS: [LatitudeBand; 10] = [
    LatitudeBand::new(80.0, 81.0, 29.05, 29.53),
    LatitudeBand::new(81.0, 82.0, 28.45, 29.10),
    // Dang valley floor reaches further north than the Pyuthan hills east of it
    LatitudeBand::new(82.0, 82.5, 28.125, 28.95),
    LatitudeBand::new(82.5, 83.0, 28.0, 28.95),
    LatitudeBand::new(83.0, 84.0, 27.75, 28.55),
    LatitudeBand::new(84.0, 85.0, 27.70, 28.30),
    LatitudeBand::new(85.0, 86.0, 27.20, 28.05),
    LatitudeBand::new(86.0, 86.5, 26.85, 27.85),
    LatitudeBand::new(86.5, 87.0, 26.85, 27.60),
    LatitudeBand::new(87.0, 88.2, 26.85, 27.30),
];

/// Maps a location to its ecological zone.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    bounds: BoundingBox,
    bands: Vec<LatitudeBand>,
}

impl Default for ZoneClassifier {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::NEPAL,
            bands: DEFAULT_BANDS.to_vec(),
        }
    }
}

impl ZoneClassifier {
    pub fn new(bounds: BoundingBox) -> std::result::Result<Self, ConfigError> {
        Self::with_bands(bounds, DEFAULT_BANDS.to_vec())
    }

    pub fn with_bands(
        bounds: BoundingBox,
        bands: Vec<LatitudeBand>,
    ) -> std::result::Result<Self, ConfigError> {
        if !bounds.is_well_formed() {
            return Err(ConfigError::Invalid(format!("malformed bounding box: {bounds}")));
        }
        if bands.is_empty() {
            return Err(ConfigError::Invalid("zone lookup has no bands".to_string()));
        }
        for band in &bands {
            let finite = [
                band.lon_min,
                band.lon_max,
                band.terai_below_lat,
                band.himalaya_from_lat,
            ]
            .iter()
            .all(|v| v.is_finite());
            if !finite || band.lon_min >= band.lon_max || band.terai_below_lat > band.himalaya_from_lat {
                return Err(ConfigError::Invalid(format!("malformed zone band: {band:?}")));
            }
        }
        Ok(Self { bounds, bands })
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Rejects non-finite coordinates and coordinates outside the bounds.
    pub fn check_bounds(&self, location: &Location) -> Result<()> {
        if !location.has_finite_coordinates() {
            return Err(RiskError::Validation(format!(
                "coordinates must be finite, got ({}, {})",
                location.latitude, location.longitude
            )));
        }
        if !self.bounds.contains(location.latitude, location.longitude) {
            return Err(RiskError::OutOfBounds {
                latitude: location.latitude,
                longitude: location.longitude,
                bounds: self.bounds,
            });
        }
        Ok(())
    }

    pub fn classify(&self, location: &Location) -> Result<EcologicalZone> {
        self.assign(location).map(|(zone, _)| zone)
    }

    /// Zone plus how it was derived.
    pub fn assign(&self, location: &Location) -> Result<(EcologicalZone, ZoneSource)> {
        self.check_bounds(location)?;

        match location.elevation_m {
            Some(elevation) => {
                let zone = zone_for_elevation(elevation).ok_or_else(|| {
                    RiskError::Validation(format!("elevation must be finite, got {elevation}"))
                })?;
                debug!(elevation, %zone, "zone from elevation");
                Ok((zone, ZoneSource::Elevation))
            }
            None => {
                let zone = self.lookup(location.latitude, location.longitude);
                warn!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    %zone,
                    "no elevation given, zone approximated from coordinates"
                );
                Ok((zone, ZoneSource::CoordinateLookup))
            }
        }
    }

    /// Coordinate-only approximation. Longitudes outside every band use the
    /// nearest band.
    pub fn lookup(&self, latitude: f64, longitude: f64) -> EcologicalZone {
        let band = self
            .bands
            .iter()
            .find(|b| longitude >= b.lon_min && longitude < b.lon_max)
            .or_else(|| {
                self.bands
                    .iter()
                    .min_by(|a, b| a.distance(longitude).total_cmp(&b.distance(longitude)))
            });

        match band {
            Some(band) => band.zone_at(latitude),
            // with_bands rejects an empty table
            None => EcologicalZone::Mahabharat,
        }
    }
}
