//! Error types for the risk engine

use crate::serde_canon::CanonicalError;
use forestsathi_types::BoundingBox;
use std::path::PathBuf;
use thiserror::Error;

/// Startup failures. Any of these aborts process start.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{artifact} artifact has schema version {found}, expected {expected}")]
    UnsupportedSchema {
        artifact: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("{artifact} artifact is missing zone {zone}")]
    MissingZone {
        artifact: &'static str,
        zone: String,
    },

    #[error("{artifact} artifact lists zone {zone} more than once")]
    DuplicateZone {
        artifact: &'static str,
        zone: String,
    },

    #[error("{artifact} artifact: {source}")]
    UnknownZone {
        artifact: &'static str,
        #[source]
        source: forestsathi_types::UnknownZone,
    },

    #[error("model artifact: {0}")]
    UnknownLabel(#[from] forestsathi_types::UnknownLabel),

    #[error("invalid {artifact} artifact: {reason}")]
    InvalidArtifact {
        artifact: &'static str,
        reason: String,
    },

    #[error("model hash mismatch: expected {expected}, computed {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("model expects features {found:?}, feature builder produces {expected:?}")]
    FeatureLayoutMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model was trained against encoder {model}, loaded encoder is {loaded}")]
    EncoderMismatch { model: String, loaded: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("canonical serialization failed: {0}")]
    Canonical(#[from] CanonicalError),
}

impl ConfigError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidArtifact {
            artifact,
            reason: reason.into(),
        }
    }
}

/// Coarse classification of [`RiskError`] for callers that render messages
/// without inspecting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    OutOfBounds,
    Configuration,
    Model,
}

/// Errors surfaced by the inference pipeline
#[derive(Error, Debug)]
pub enum RiskError {
    /// Malformed caller input (month, non-finite numbers)
    #[error("validation error: {0}")]
    Validation(String),

    /// Coordinate outside the supported country extent
    #[error("coordinate ({latitude}, {longitude}) is outside the supported extent ({bounds})")]
    OutOfBounds {
        latitude: f64,
        longitude: f64,
        bounds: BoundingBox,
    },

    /// Artifact or configuration problem detected at startup
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Feature vector does not match the loaded model
    #[error("model error: {0}")]
    Model(String),
}

impl RiskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::Validation(_) => ErrorKind::Validation,
            RiskError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            RiskError::Configuration(_) => ErrorKind::Configuration,
            RiskError::Model(_) => ErrorKind::Model,
        }
    }

    /// Caller can fix the input and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::OutOfBounds)
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_recoverability() {
        let validation = RiskError::Validation("month 13".into());
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(validation.is_recoverable());

        let bounds = RiskError::OutOfBounds {
            latitude: 40.0,
            longitude: 85.0,
            bounds: BoundingBox::NEPAL,
        };
        assert_eq!(bounds.kind(), ErrorKind::OutOfBounds);
        assert!(bounds.is_recoverable());

        let model = RiskError::Model("length".into());
        assert_eq!(model.kind(), ErrorKind::Model);
        assert!(!model.is_recoverable());

        let config: RiskError = ConfigError::Invalid("x".into()).into();
        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert!(!config.is_recoverable());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = ConfigError::UnsupportedSchema {
            artifact: "model",
            found: 2,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "model artifact has schema version 2, expected 1"
        );
    }
}
