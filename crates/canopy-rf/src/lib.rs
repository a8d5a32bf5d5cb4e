//! Random forest classification: train, score, persist.
//!
//! A bagged ensemble of CART trees with Gini/Entropy split criteria,
//! per-split feature subsampling, parallel training via rayon, mean-decrease-
//! in-impurity feature importances, confusion-matrix evaluation, and a
//! versioned bincode model file.

mod config;
mod confusion;
mod error;
mod forest;
mod importance;
mod node;
mod predict;
mod result;
mod serialize;
mod split;
mod tree;
mod validate;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::RfError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use result::{RandomForestResult, TrainingMetadata};
pub use serialize::FORMAT_VERSION;
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
