//! Training-time zone encoder
//!
//! The encoder artifact lists zone class names in code order, exactly as the
//! label encoder fitted during training. Codes are never re-derived here.

use crate::errors::ConfigError;
use crate::serde_canon::fingerprint;
use forestsathi_types::EcologicalZone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ENCODER_SCHEMA_VERSION: u32 = 1;

const ARTIFACT: &str = "encoder";

/// Encoder artifact as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub schema_version: u32,
    /// Class names; position is the integer code.
    pub classes: Vec<String>,
}

impl EncoderArtifact {
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

/// Injective zone to code mapping with its artifact fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEncoder {
    /// Indexed by `EcologicalZone::index()`.
    codes: [u32; 3],
    /// Indexed by code.
    zones: Vec<EcologicalZone>,
    fingerprint: String,
}

impl ZoneEncoder {
    pub fn from_artifact(artifact: &EncoderArtifact) -> Result<Self, ConfigError> {
        if artifact.schema_version != ENCODER_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema {
                artifact: ARTIFACT,
                found: artifact.schema_version,
                expected: ENCODER_SCHEMA_VERSION,
            });
        }

        let mut codes: [Option<u32>; 3] = [None; 3];
        let mut zones = Vec::with_capacity(artifact.classes.len());

        for (code, name) in artifact.classes.iter().enumerate() {
            let zone: EcologicalZone = name
                .parse()
                .map_err(|source| ConfigError::UnknownZone {
                    artifact: ARTIFACT,
                    source,
                })?;
            let slot = &mut codes[zone.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateZone {
                    artifact: ARTIFACT,
                    zone: zone.to_string(),
                });
            }
            let code = u32::try_from(code)
                .map_err(|_| ConfigError::invalid(ARTIFACT, "too many classes"))?;
            *slot = Some(code);
            zones.push(zone);
        }

        let mut resolved = [0u32; 3];
        for zone in EcologicalZone::ALL {
            resolved[zone.index()] = codes[zone.index()].ok_or_else(|| ConfigError::MissingZone {
                artifact: ARTIFACT,
                zone: zone.to_string(),
            })?;
        }

        Ok(Self {
            codes: resolved,
            zones,
            fingerprint: fingerprint(artifact)?,
        })
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_artifact(&EncoderArtifact::load_json(path)?)
    }

    pub fn encode(&self, zone: EcologicalZone) -> u32 {
        self.codes[zone.index()]
    }

    pub fn decode(&self, code: u32) -> Option<EcologicalZone> {
        self.zones.get(usize::try_from(code).ok()?).copied()
    }

    /// Hex SHA-256 of the artifact's canonical JSON
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(classes: &[&str]) -> EncoderArtifact {
        EncoderArtifact {
            schema_version: ENCODER_SCHEMA_VERSION,
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn training_order() -> EncoderArtifact {
        artifact(&["High Himalayas", "Mahabharat Range (Hills)", "Terai Plains"])
    }

    #[test]
    fn codes_follow_artifact_order() {
        let encoder = ZoneEncoder::from_artifact(&training_order()).unwrap();
        assert_eq!(encoder.encode(EcologicalZone::Himalaya), 0);
        assert_eq!(encoder.encode(EcologicalZone::Mahabharat), 1);
        assert_eq!(encoder.encode(EcologicalZone::Terai), 2);

        for zone in EcologicalZone::ALL {
            assert_eq!(encoder.decode(encoder.encode(zone)), Some(zone));
        }
        assert_eq!(encoder.decode(3), None);
    }

    #[test]
    fn fingerprint_matches_offline_tooling() {
        let encoder = ZoneEncoder::from_artifact(&training_order()).unwrap();
        assert_eq!(
            encoder.fingerprint(),
            "29c2c95c1e1ebeadfc172d7a624891e8a723f3aaad0e0bf6c1103a69e1023315"
        );

        let reordered =
            ZoneEncoder::from_artifact(&artifact(&["Terai", "Mahabharat", "Himalaya"])).unwrap();
        assert_ne!(encoder.fingerprint(), reordered.fingerprint());
    }

    #[test]
    fn rejects_incomplete_or_ambiguous_artifacts() {
        assert!(matches!(
            ZoneEncoder::from_artifact(&artifact(&["Terai", "Hills"])),
            Err(ConfigError::MissingZone { .. })
        ));
        assert!(matches!(
            ZoneEncoder::from_artifact(&artifact(&["Terai", "Terai Plains", "Himalaya"])),
            Err(ConfigError::DuplicateZone { .. })
        ));
        assert!(matches!(
            ZoneEncoder::from_artifact(&artifact(&["Terai", "Hills", "Tundra"])),
            Err(ConfigError::UnknownZone { .. })
        ));

        let mut wrong_version = training_order();
        wrong_version.schema_version = 2;
        assert!(matches!(
            ZoneEncoder::from_artifact(&wrong_version),
            Err(ConfigError::UnsupportedSchema { found: 2, .. })
        ));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.json");
        std::fs::write(
            &path,
            r#"{"schema_version": 1, "classes": ["High Himalayas", "Mahabharat Range (Hills)", "Terai Plains"]}"#,
        )
        .unwrap();

        let encoder = ZoneEncoder::load_json(&path).unwrap();
        assert_eq!(encoder.encode(EcologicalZone::Terai), 2);
        // whitespace in the file does not change the fingerprint
        assert_eq!(
            encoder.fingerprint(),
            ZoneEncoder::from_artifact(&training_order()).unwrap().fingerprint()
        );
    }
}
