//! Risk classifier over the tree-ensemble model

use crate::errors::{ConfigError, Result, RiskError};
use crate::features::{FeatureBuilder, FeatureVector, FEATURE_LAYOUT};
use crate::gbdt::Model;
use forestsathi_types::{ClassProbabilities, RiskLabel};
use std::path::Path;
use tracing::{debug, info};

/// Immutable model plus its label decoder.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    model: Model,
    /// Class index to label, from the artifact's `classes`.
    labels: Vec<RiskLabel>,
    model_hash: String,
}

impl RiskClassifier {
    pub fn new(model: Model) -> std::result::Result<Self, ConfigError> {
        model.validate()?;
        let labels = model.decode_classes()?;
        let model_hash = model.hash_hex()?;

        info!(
            model_version = %model.model_version,
            model_hash = %model_hash,
            trees = model.num_trees(),
            features = model.feature_count(),
            "risk model loaded"
        );

        Ok(Self {
            model,
            labels,
            model_hash,
        })
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        Self::new(Model::load_json(path)?)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_version(&self) -> &str {
        &self.model.model_version
    }

    /// Hex SHA-256 of the model's canonical JSON
    pub fn model_hash(&self) -> &str {
        &self.model_hash
    }

    pub fn feature_count(&self) -> usize {
        self.model.feature_count()
    }

    pub fn verify_hash(&self, expected: &str) -> std::result::Result<(), ConfigError> {
        if !self.model_hash.eq_ignore_ascii_case(expected.trim()) {
            return Err(ConfigError::HashMismatch {
                expected: expected.trim().to_string(),
                actual: self.model_hash.clone(),
            });
        }
        Ok(())
    }

    /// The model must consume exactly what `builder` produces.
    pub fn check_compatibility(&self, builder: &FeatureBuilder) -> std::result::Result<(), ConfigError> {
        if self.model.feature_names.iter().map(String::as_str).ne(FEATURE_LAYOUT) {
            return Err(ConfigError::FeatureLayoutMismatch {
                expected: builder.layout().iter().map(|s| s.to_string()).collect(),
                found: self.model.feature_names.clone(),
            });
        }

        let loaded = builder.encoder().fingerprint();
        if !self.model.encoder_fingerprint.eq_ignore_ascii_case(loaded) {
            return Err(ConfigError::EncoderMismatch {
                model: self.model.encoder_fingerprint.clone(),
                loaded: loaded.to_string(),
            });
        }

        Ok(())
    }

    /// Class probabilities for one feature vector. Deterministic: equal
    /// vectors give bit-identical output.
    pub fn predict(&self, vector: &FeatureVector) -> Result<ClassProbabilities> {
        if vector.len() != self.model.feature_count() {
            return Err(RiskError::Model(format!(
                "feature vector has {} values, model expects {}",
                vector.len(),
                self.model.feature_count()
            )));
        }
        if !self
            .model
            .encoder_fingerprint
            .eq_ignore_ascii_case(vector.encoder_fingerprint())
        {
            return Err(RiskError::Model(format!(
                "feature vector was encoded with {}, model expects {}",
                vector.encoder_fingerprint(),
                self.model.encoder_fingerprint
            )));
        }

        let sums = self
            .model
            .class_sums(vector.values())
            .ok_or_else(|| RiskError::Model("tree evaluation failed or overflowed".to_string()))?;

        let total = sums
            .iter()
            .try_fold(0i128, |acc, &sum| acc.checked_add(sum))
            .ok_or_else(|| RiskError::Model("class weight total overflows".to_string()))?;
        if total <= 0 {
            return Err(RiskError::Model(
                "ensemble produced no class weight".to_string(),
            ));
        }

        let mut by_label = [0f64; 3];
        for (label, sum) in self.labels.iter().zip(&sums) {
            by_label[label.index()] = *sum as f64 / total as f64;
        }

        let probabilities = ClassProbabilities::new(by_label[0], by_label[1], by_label[2])
            .map_err(|e| RiskError::Model(e.to_string()))?;

        debug!(
            low = probabilities.get(RiskLabel::Low),
            moderate = probabilities.get(RiskLabel::Moderate),
            high = probabilities.get(RiskLabel::High),
            "prediction"
        );

        Ok(probabilities)
    }

    /// Probabilities plus the argmax label, ties going to the higher severity.
    pub fn classify(&self, vector: &FeatureVector) -> Result<(ClassProbabilities, RiskLabel)> {
        let probabilities = self.predict(vector)?;
        let label = probabilities.predicted_label();
        Ok((probabilities, label))
    }
}
