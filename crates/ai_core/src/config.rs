//! Engine configuration
//!
//! Loaded from TOML; every section is optional. Relative artifact paths
//! resolve against the directory of the config file, and `FORESTSATHI_*`
//! environment variables override file values.

use crate::errors::ConfigError;
use crate::insight::DEFAULT_WINDOW_RATIO;
use forestsathi_types::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config/forestsathi.toml";

pub const ENV_MODEL_PATH: &str = "FORESTSATHI_MODEL_PATH";
pub const ENV_ENCODER_PATH: &str = "FORESTSATHI_ENCODER_PATH";
pub const ENV_REGION_STATS_PATH: &str = "FORESTSATHI_REGION_STATS_PATH";
pub const ENV_EXPECTED_MODEL_HASH: &str = "FORESTSATHI_EXPECTED_MODEL_HASH";
pub const ENV_LOG_LEVEL: &str = "FORESTSATHI_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub artifacts: ArtifactsConfig,
    pub bounds: BoundsConfig,
    pub insight: InsightConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub model_path: PathBuf,
    pub encoder_path: PathBuf,
    pub region_stats_path: PathBuf,
    /// Hex SHA-256 the loaded model must hash to
    pub expected_model_hash: Option<String>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.json"),
            encoder_path: PathBuf::from("artifacts/encoder.json"),
            region_stats_path: PathBuf::from("artifacts/region_stats.json"),
            expected_model_hash: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        let b = BoundingBox::NEPAL;
        Self {
            min_latitude: b.min_latitude,
            max_latitude: b.max_latitude,
            min_longitude: b.min_longitude,
            max_longitude: b.max_longitude,
        }
    }
}

impl From<&BoundsConfig> for BoundingBox {
    fn from(c: &BoundsConfig) -> Self {
        BoundingBox {
            min_latitude: c.min_latitude,
            max_latitude: c.max_latitude,
            min_longitude: c.min_longitude,
            max_longitude: c.max_longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Fraction of the peak month's frequency that puts a month in the
    /// high-risk window
    pub high_risk_window_ratio: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            high_risk_window_ratio: DEFAULT_WINDOW_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: EngineConfig = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Load from `path` with process environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load from `path`, reading overrides through `lookup`.
    pub fn load_with_env<P, F>(path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.apply_env_overrides(lookup);
        config.validate()?;

        debug!(
            config = %path.display(),
            model = %config.artifacts.model_path.display(),
            encoder = %config.artifacts.encoder_path.display(),
            region_stats = %config.artifacts.region_stats_path.display(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Make relative artifact paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.artifacts.model_path,
            &mut self.artifacts.encoder_path,
            &mut self.artifacts.region_stats_path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Empty values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_MODEL_PATH) {
            self.artifacts.model_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_ENCODER_PATH) {
            self.artifacts.encoder_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_REGION_STATS_PATH) {
            self.artifacts.region_stats_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_EXPECTED_MODEL_HASH) {
            self.artifacts.expected_model_hash = Some(v.trim().to_string());
        }
        if let Some(v) = get(ENV_LOG_LEVEL) {
            self.logging.level = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = self.bounding_box();
        if !bounds.is_well_formed() {
            return Err(ConfigError::Invalid(format!(
                "bounds must be finite and ordered, got {bounds}"
            )));
        }

        let ratio = self.insight.high_risk_window_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "insight.high_risk_window_ratio must be in (0, 1], got {ratio}"
            )));
        }

        if let Some(hash) = &self.artifacts.expected_model_hash {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::Invalid(format!(
                    "artifacts.expected_model_hash must be 64 hex characters, got '{hash}'"
                )));
            }
        }

        Ok(())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from(&self.bounds)
    }

    fn normalize(&mut self) {
        if let Some(hash) = &self.artifacts.expected_model_hash {
            let trimmed = hash.trim();
            self.artifacts.expected_model_hash = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[artifacts]
model_path = "../artifacts/model.json"
encoder_path = "/opt/forestsathi/encoder.json"

[insight]
high_risk_window_ratio = 0.5
"#;

    #[test]
    fn empty_file_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.bounding_box(), BoundingBox::NEPAL);
        assert_eq!(config.insight.high_risk_window_ratio, 0.6);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = EngineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.insight.high_risk_window_ratio, 0.5);
        assert_eq!(
            config.artifacts.region_stats_path,
            PathBuf::from("artifacts/region_stats.json")
        );

        let config = EngineConfig::from_toml_str("[bounds]\nmax_latitude = 31.0\n").unwrap();
        assert_eq!(config.bounds.max_latitude, 31.0);
        assert_eq!(config.bounds.min_latitude, 26.3);
    }

    #[test]
    fn relative_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");
        std::fs::create_dir(&config_dir).unwrap();
        let path = config_dir.join("forestsathi.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = EngineConfig::load_with_env(&path, |_| None).unwrap();
        assert_eq!(
            config.artifacts.model_path,
            config_dir.join("../artifacts/model.json")
        );
        assert_eq!(
            config.artifacts.encoder_path,
            PathBuf::from("/opt/forestsathi/encoder.json")
        );
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forestsathi.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let hash = "ab".repeat(32);
        let env: HashMap<&str, String> = HashMap::from([
            (ENV_MODEL_PATH, "/srv/model.json".to_string()),
            (ENV_REGION_STATS_PATH, String::new()),
            (ENV_EXPECTED_MODEL_HASH, hash.clone()),
            (ENV_LOG_LEVEL, "debug".to_string()),
        ]);
        let config = EngineConfig::load_with_env(&path, |k| env.get(k).cloned()).unwrap();

        assert_eq!(config.artifacts.model_path, PathBuf::from("/srv/model.json"));
        // empty override ignored
        assert_eq!(
            config.artifacts.region_stats_path,
            dir.path().join("artifacts/region_stats.json")
        );
        assert_eq!(config.artifacts.expected_model_hash, Some(hash));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = EngineConfig::from_toml_str("[insight]\nhigh_risk_window_ratio = 0.0\n").unwrap();
        assert!(config.validate().is_err());

        let config = EngineConfig::from_toml_str("[insight]\nhigh_risk_window_ratio = 1.5\n").unwrap();
        assert!(config.validate().is_err());

        let config = EngineConfig::from_toml_str(
            "[bounds]\nmin_latitude = 31.0\nmax_latitude = 26.0\n",
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config =
            EngineConfig::from_toml_str("[artifacts]\nexpected_model_hash = \"xyz\"\n").unwrap();
        assert!(config.validate().is_err());

        let config =
            EngineConfig::from_toml_str("[artifacts]\nexpected_model_hash = \"  \"\n").unwrap();
        assert_eq!(config.artifacts.expected_model_hash, None);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("[artifacts\nmodel_path = 1"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            EngineConfig::load_with_env("/no/such/forestsathi.toml", |_| None),
            Err(ConfigError::Io { .. })
        ));
    }
}
