//! Decision tree structures for ensemble inference
//!
//! Nodes carry fixed-point integers only. Leaves hold one weight per risk
//! class, in the order of the owning model's `classes`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// Internal nodes have `feature_idx >= 0`, child indices in `left`/`right`
/// and no `leaf`. Leaves have `feature_idx == -1`, `left == right == -1`
/// and per-class weights in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    pub left: i32,

    pub right: i32,

    #[serde(rename = "feature_idx", alias = "feature")]
    pub feature_idx: i32,

    /// Split threshold; traversal goes left when `feature <= threshold`
    pub threshold: i64,

    /// Per-class weights for leaf nodes
    pub leaf: Option<Vec<i64>>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, class_weights: Vec<i64>) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0,
            leaf: Some(class_weights),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }
}

/// A single weighted decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,

    /// Ensemble weight (fixed-point integer)
    pub weight: i64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: i64) -> Self {
        Self { nodes, weight }
    }

    /// Walk the tree and return the reached leaf's class weights.
    ///
    /// Returns `None` only for trees that would fail [`Tree::validate`] or
    /// for feature vectors shorter than a referenced feature index.
    pub fn evaluate(&self, features: &[i64]) -> Option<&[i64]> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;

            if let Some(weights) = &node.leaf {
                return Some(weights);
            }

            let feature_value = *features.get(usize::try_from(node.feature_idx).ok()?)?;
            let next = if feature_value <= node.threshold {
                node.left
            } else {
                node.right
            };

            let next = usize::try_from(next).ok()?;
            if next <= idx {
                return None;
            }
            idx = next;
        }
    }

    /// Validate structure against the model's feature and class counts.
    ///
    /// Children must point strictly forward, which rules out cycles.
    pub fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        if self.weight <= 0 {
            return Err(format!("tree weight must be positive, got {}", self.weight));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match &node.leaf {
                Some(weights) => {
                    if weights.len() != class_count {
                        return Err(format!(
                            "leaf {} has {} class weights, expected {}",
                            i,
                            weights.len(),
                            class_count
                        ));
                    }
                    if weights.iter().any(|&w| w < 0) {
                        return Err(format!("leaf {i} has a negative class weight"));
                    }
                    if weights.iter().all(|&w| w == 0) {
                        return Err(format!("leaf {i} has no positive class weight"));
                    }
                }
                None => {
                    let feature_ok = usize::try_from(node.feature_idx)
                        .map(|f| f < feature_count)
                        .unwrap_or(false);
                    if !feature_ok {
                        return Err(format!(
                            "node {} splits on invalid feature index {}",
                            i, node.feature_idx
                        ));
                    }
                    for (side, child) in [("left", node.left), ("right", node.right)] {
                        let child_ok = usize::try_from(child)
                            .map(|c| c > i && c < self.nodes.len())
                            .unwrap_or(false);
                        if !child_ok {
                            return Err(format!("node {i} has invalid {side} child {child}"));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_tree() -> Tree {
        // feature[0] <= 50 -> mostly Low, else mostly High
        Tree::new(
            vec![
                Node::internal(0, 0, 50, 1, 2),
                Node::leaf(1, vec![8, 1, 1]),
                Node::leaf(2, vec![1, 1, 8]),
            ],
            1_000_000,
        )
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 12345, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, vec![1, 2, 3]);
        assert_eq!(leaf.feature_idx, -1);
        assert!(leaf.is_leaf());
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = split_tree();
        assert_eq!(tree.evaluate(&[30]), Some(&[8, 1, 1][..]));
        assert_eq!(tree.evaluate(&[50]), Some(&[8, 1, 1][..])); // equal goes left
        assert_eq!(tree.evaluate(&[60]), Some(&[1, 1, 8][..]));
    }

    #[test]
    fn test_short_feature_vector() {
        assert_eq!(split_tree().evaluate(&[]), None);
    }

    #[test]
    fn test_tree_validation() {
        assert!(split_tree().validate(1, 3).is_ok());
        // feature 0 is out of range for a zero-feature model
        assert!(split_tree().validate(0, 3).is_err());
        // leaves carry three weights, model expects two classes
        assert!(split_tree().validate(1, 2).is_err());

        let out_of_bounds = Tree::new(
            vec![
                Node::internal(0, 0, 50, 5, 2),
                Node::leaf(1, vec![1, 1, 1]),
                Node::leaf(2, vec![1, 1, 1]),
            ],
            1_000_000,
        );
        assert!(out_of_bounds.validate(1, 3).is_err());

        let backwards = Tree::new(
            vec![
                Node::leaf(0, vec![1, 1, 1]),
                Node::internal(1, 0, 50, 0, 2),
                Node::leaf(2, vec![1, 1, 1]),
            ],
            1_000_000,
        );
        // root is a leaf, but node 1 still points backwards
        assert!(backwards.validate(1, 3).is_err());
    }

    #[test]
    fn test_leaf_weights_validation() {
        let negative = Tree::new(vec![Node::leaf(0, vec![-1, 1, 1])], 1);
        assert!(negative.validate(1, 3).is_err());

        let empty = Tree::new(vec![Node::leaf(0, vec![0, 0, 0])], 1);
        assert!(empty.validate(1, 3).is_err());

        let unweighted = Tree::new(vec![Node::leaf(0, vec![1, 0, 0])], 0);
        assert!(unweighted.validate(1, 3).is_err());
    }

    #[test]
    fn test_deterministic_traversal() {
        let tree = split_tree();
        let features = vec![30, 40, 50];
        let first = tree.evaluate(&features);
        for _ in 0..10 {
            assert_eq!(tree.evaluate(&features), first);
        }
    }
}
