//! Versioned tree-ensemble risk model
//!
//! The model artifact is an opaque, schema-versioned JSON document produced
//! by the offline training pipeline. It carries its own input contract
//! (`feature_names`), its label decoder (`classes`) and the fingerprint of
//! the zone encoder it was trained against.

use super::tree::Tree;
use crate::errors::ConfigError;
use crate::serde_canon::{fingerprint, to_canonical_json};
use forestsathi_types::RiskLabel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Model artifact schema understood by this build
pub const MODEL_SCHEMA_VERSION: u32 = 1;

/// Default fixed-point scale (1e6)
pub const SCALE: i64 = 1_000_000;

const ARTIFACT: &str = "model";

/// Tree-ensemble model as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub schema_version: u32,

    /// Free-form release tag assigned by the training pipeline
    pub model_version: String,

    /// Fixed-point scale of tree weights
    pub scale: i64,

    /// Input contract: one name per feature slot, in order
    pub feature_names: Vec<String>,

    /// Label decoder: class index to risk label name
    pub classes: Vec<String>,

    /// Fingerprint of the zone encoder used at training time
    pub encoder_fingerprint: String,

    pub trees: Vec<Tree>,
}

impl Model {
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Decode `classes` into risk labels, requiring each label exactly once.
    pub fn decode_classes(&self) -> Result<Vec<RiskLabel>, ConfigError> {
        let labels = self
            .classes
            .iter()
            .map(|name| name.parse::<RiskLabel>())
            .collect::<Result<Vec<_>, _>>()?;

        for label in RiskLabel::ALL {
            let count = labels.iter().filter(|&&l| l == label).count();
            if count != 1 {
                return Err(ConfigError::invalid(
                    ARTIFACT,
                    format!("label {label} appears {count} times in classes"),
                ));
            }
        }
        Ok(labels)
    }

    /// Structural validation. Failures are fatal configuration errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != MODEL_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema {
                artifact: ARTIFACT,
                found: self.schema_version,
                expected: MODEL_SCHEMA_VERSION,
            });
        }

        if self.scale <= 0 {
            return Err(ConfigError::invalid(
                ARTIFACT,
                format!("scale must be positive, got {}", self.scale),
            ));
        }

        if self.feature_names.is_empty() {
            return Err(ConfigError::invalid(ARTIFACT, "no feature names"));
        }

        self.decode_classes()?;

        if self.trees.is_empty() {
            return Err(ConfigError::invalid(ARTIFACT, "model has no trees"));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count(), self.classes.len())
                .map_err(|e| ConfigError::invalid(ARTIFACT, format!("tree {i}: {e}")))?;
        }

        self.check_weight_range()
    }

    /// Every leaf must keep a positive weight after scaling, and the largest
    /// possible ensemble total must fit in i128.
    fn check_weight_range(&self) -> Result<(), ConfigError> {
        let mut worst_total: i128 = 0;

        for (i, tree) in self.trees.iter().enumerate() {
            let mut tree_max: i128 = 0;
            for node in tree.nodes.iter() {
                let Some(weights) = &node.leaf else { continue };
                let total = weights
                    .iter()
                    .try_fold(0i128, |acc, &w| {
                        acc.checked_add(self.scaled(w, tree.weight))
                    })
                    .ok_or_else(|| {
                        ConfigError::invalid(
                            ARTIFACT,
                            format!("tree {i}: leaf {} weights overflow", node.id),
                        )
                    })?;
                if total <= 0 {
                    return Err(ConfigError::invalid(
                        ARTIFACT,
                        format!(
                            "tree {i}: leaf {} has no class weight left at scale {}",
                            node.id, self.scale
                        ),
                    ));
                }
                tree_max = tree_max.max(total);
            }

            worst_total = worst_total.checked_add(tree_max).ok_or_else(|| {
                ConfigError::invalid(ARTIFACT, "ensemble class weights overflow")
            })?;
        }

        Ok(())
    }

    fn scaled(&self, leaf_weight: i64, tree_weight: i64) -> i128 {
        i128::from(leaf_weight) * i128::from(tree_weight) / i128::from(self.scale)
    }

    /// Sum weighted leaf class weights over all trees.
    ///
    /// Integer-only: `leaf[c] * tree.weight / scale`, accumulated in i128.
    /// Returns `None` when a tree cannot be evaluated on `features` or a sum
    /// overflows.
    pub fn class_sums(&self, features: &[i64]) -> Option<Vec<i128>> {
        let mut sums = vec![0i128; self.classes.len()];

        for tree in &self.trees {
            let leaf = tree.evaluate(features)?;
            for (sum, &weight) in sums.iter_mut().zip(leaf) {
                *sum = sum.checked_add(self.scaled(weight, tree.weight))?;
            }
        }

        Some(sums)
    }

    pub fn to_canonical_json(&self) -> Result<String, ConfigError> {
        Ok(to_canonical_json(self)?)
    }

    /// Hex SHA-256 of the canonical JSON form
    pub fn hash_hex(&self) -> Result<String, ConfigError> {
        Ok(fingerprint(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_canonical_json()?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and validate a model artifact
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Model = serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbdt::tree::Node;

    fn create_test_model() -> Model {
        let tree1 = Tree::new(
            vec![
                Node::internal(0, 0, 50 * SCALE, 1, 2),
                Node::leaf(1, vec![6 * SCALE, 3 * SCALE, SCALE]),
                Node::leaf(2, vec![SCALE, 3 * SCALE, 6 * SCALE]),
            ],
            SCALE,
        );
        let tree2 = Tree::new(
            vec![
                Node::internal(0, 1, 30 * SCALE, 1, 2),
                Node::leaf(1, vec![2 * SCALE, 0, 0]),
                Node::leaf(2, vec![0, 0, 2 * SCALE]),
            ],
            SCALE / 2,
        );

        Model {
            schema_version: MODEL_SCHEMA_VERSION,
            model_version: "test".to_string(),
            scale: SCALE,
            feature_names: vec!["a".to_string(), "b".to_string()],
            classes: vec!["Low".into(), "Moderate".into(), "High".into()],
            encoder_fingerprint: "enc".to_string(),
            trees: vec![tree1, tree2],
        }
    }

    #[test]
    fn test_model_validation() {
        assert!(create_test_model().validate().is_ok());

        let mut invalid = create_test_model();
        invalid.scale = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = create_test_model();
        invalid.schema_version = 999;
        assert!(matches!(
            invalid.validate(),
            Err(ConfigError::UnsupportedSchema { found: 999, .. })
        ));

        let mut invalid = create_test_model();
        invalid.trees.clear();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_classes_must_cover_every_label_once() {
        let mut model = create_test_model();
        model.classes = vec!["Low".into(), "Low".into(), "High".into()];
        assert!(model.validate().is_err());

        model.classes = vec!["Low".into(), "Moderate".into(), "Severe".into()];
        assert!(matches!(model.validate(), Err(ConfigError::UnknownLabel(_))));

        model.classes = vec!["High Risk".into(), "Low Risk".into(), "Moderate".into()];
        assert_eq!(
            model.decode_classes().unwrap(),
            vec![RiskLabel::High, RiskLabel::Low, RiskLabel::Moderate]
        );
    }

    #[test]
    fn test_class_sums() {
        let model = create_test_model();

        // tree1 left (6,3,1), tree2 left at half weight (1,0,0)
        let sums = model.class_sums(&[30 * SCALE, 20 * SCALE]).unwrap();
        assert_eq!(sums, vec![7 * SCALE as i128, 3 * SCALE as i128, SCALE as i128]);

        // tree1 right (1,3,6), tree2 right at half weight (0,0,1)
        let sums = model.class_sums(&[60 * SCALE, 40 * SCALE]).unwrap();
        assert_eq!(sums, vec![SCALE as i128, 3 * SCALE as i128, 7 * SCALE as i128]);

        assert!(model.class_sums(&[0]).is_none());
    }

    #[test]
    fn test_hash_deterministic_and_sensitive() {
        let model = create_test_model();
        let hash = model.hash_hex().unwrap();
        assert_eq!(hash, create_test_model().hash_hex().unwrap());
        assert_eq!(hash.len(), 64);

        let mut changed = create_test_model();
        changed.trees[0].nodes[1] = Node::leaf(1, vec![SCALE, SCALE, SCALE]);
        assert_ne!(hash, changed.hash_hex().unwrap());
    }

    #[test]
    fn test_leaves_vanishing_at_scale_rejected() {
        let mut model = create_test_model();
        model.trees = vec![Tree::new(vec![Node::leaf(0, vec![1, 0, 0])], 1)];
        let err = model.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArtifact { .. }), "{err}");
        assert!(err.to_string().contains("no class weight left"));

        // the same leaf survives once the tree weight compensates
        model.trees = vec![Tree::new(vec![Node::leaf(0, vec![1, 0, 0])], SCALE)];
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_overflowing_weights_rejected() {
        let mut model = create_test_model();
        model.scale = 1;
        model.trees = vec![Tree::new(vec![Node::leaf(0, vec![i64::MAX; 3])], i64::MAX)];
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("overflow"), "{err}");

        // each tree fits on its own but the ensemble does not
        let big = Tree::new(vec![Node::leaf(0, vec![i64::MAX, 0, 0])], i64::MAX);
        model.trees = vec![big.clone(), big.clone(), big];
        assert!(matches!(
            model.validate(),
            Err(ConfigError::InvalidArtifact { .. })
        ));

        model.trees.truncate(1);
        assert!(model.validate().is_ok());
        assert!(model.class_sums(&[0, 0]).is_some());
    }

    #[test]
    fn test_save_load_json() {
        use tempfile::NamedTempFile;

        let model = create_test_model();
        let temp_file = NamedTempFile::new().unwrap();
        model.save_json(temp_file.path()).unwrap();

        let loaded = Model::load_json(temp_file.path()).unwrap();
        assert_eq!(model, loaded);
        assert_eq!(model.hash_hex().unwrap(), loaded.hash_hex().unwrap());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"schema_version\": 1").unwrap();
        assert!(matches!(
            Model::load_json(file.path()),
            Err(ConfigError::Json { .. })
        ));
        assert!(matches!(
            Model::load_json("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
