//! Integer-only tree-ensemble classifier
//!
//! - **No floating point during traversal**: thresholds, features and leaf
//!   class weights are fixed-point integers (typically 1e6 scale)
//! - **Canonical serialization**: sorted JSON keys give a reproducible hash
//! - **SHA-256 model hash**: ties a deployment to one exact artifact
//!
//! # Model Format
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "model_version": "2024.1",
//!   "scale": 1000000,
//!   "feature_names": ["zone_code", "month", "seasonal_share", "peak_ratio", "historical_fires"],
//!   "classes": ["High", "Low", "Moderate"],
//!   "encoder_fingerprint": "29c2c95c...",
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature_idx":1,"threshold":5500000,"leaf":null},
//!         {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0,"leaf":[700000,100000,200000]},
//!         {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0,"leaf":[50000,800000,150000]}
//!       ],
//!       "weight": 1000000
//!     }
//!   ]
//! }
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use forestsathi_ai_core::gbdt::{Model, Node, Tree, SCALE};
//!
//! let tree = Tree::new(
//!     vec![
//!         Node::internal(0, 1, 5 * SCALE, 1, 2),
//!         Node::leaf(1, vec![SCALE, 0, 0]),
//!         Node::leaf(2, vec![0, 0, SCALE]),
//!     ],
//!     SCALE,
//! );
//! let model = Model {
//!     schema_version: 1,
//!     model_version: "demo".to_string(),
//!     scale: SCALE,
//!     feature_names: vec!["zone_code".into(), "month".into()],
//!     classes: vec!["Low".into(), "Moderate".into(), "High".into()],
//!     encoder_fingerprint: String::new(),
//!     trees: vec![tree],
//! };
//! let sums = model.class_sums(&[0, 4 * SCALE]);
//! let hash = model.hash_hex().unwrap();
//! ```

pub mod model;
pub mod tree;

pub use model::{Model, MODEL_SCHEMA_VERSION, SCALE};
pub use tree::{Node, Tree};
