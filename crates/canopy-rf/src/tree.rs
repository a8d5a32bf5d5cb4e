//! CART decision trees grown depth-first into a flat node arena.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Node, NodeIndex},
    split::{SplitCriterion, SplitParams, find_best_split},
    validate::{infer_n_classes, to_columns, validate_training_data},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default                  |
/// |---------------------|--------------------------|
/// | `criterion`         | `Gini`                   |
/// | `max_depth`         | `None` (unlimited)       |
/// | `min_samples_split` | 2                        |
/// | `min_samples_leaf`  | 1                        |
/// | `max_features`      | `None` (all features)    |
/// | `n_classes`         | `None` (from the labels) |
/// | `seed`              | 42                       |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) n_classes: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            n_classes: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth (root is depth 0). `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the number of features drawn at each split. `None` means all.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Fix the width of leaf distributions.
    ///
    /// Trees inside a forest see bootstrap samples that may miss the highest
    /// class, so the forest passes its own class count down.
    #[must_use]
    pub fn with_n_classes(mut self, n_classes: Option<usize>) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train a decision tree on a row-major dataset.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                              |
    /// |--------------------------------------|---------------------------------------------------|
    /// | [`RfError::EmptyDataset`]            | `features` is empty                               |
    /// | [`RfError::ZeroFeatures`]            | rows have zero feature columns                    |
    /// | [`RfError::LabelCountMismatch`]      | `labels.len() != features.len()`                  |
    /// | [`RfError::FeatureCountMismatch`]    | rows have inconsistent lengths                    |
    /// | [`RfError::NonFiniteValue`]          | any value is NaN or infinite                      |
    /// | [`RfError::InvalidMaxFeatures`]      | `max_features` outside [1, n_features]            |
    /// | [`RfError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`                          |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2                           |
    /// | [`RfError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` < 1                            |
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let shape = validate_training_data(features, labels)?;
        self.validate()?;

        let max_features = self.max_features.unwrap_or(shape.n_features);
        if max_features == 0 || max_features > shape.n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features: shape.n_features,
            });
        }

        let n_classes = self
            .n_classes
            .unwrap_or(0)
            .max(infer_n_classes(labels));

        let columns = to_columns(features, shape.n_features);
        let indices: Vec<usize> = (0..shape.n_samples).collect();

        let mut builder = TreeBuilder {
            columns: &columns,
            labels,
            config: self,
            params: SplitParams {
                n_classes,
                criterion: self.criterion,
                max_features,
                min_samples_leaf: self.min_samples_leaf,
            },
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        builder.grow(&indices, 0);

        debug!(
            n_nodes = builder.arena.len(),
            n_classes,
            max_features,
            "decision tree built"
        );

        Ok(DecisionTree {
            nodes: builder.arena,
            n_features: shape.n_features,
            n_classes,
        })
    }

    fn validate(&self) -> Result<(), RfError> {
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive arena builder. Children are pushed after their parent's slot is
/// reserved, so the root always lands at index 0.
struct TreeBuilder<'a> {
    columns: &'a [Vec<f64>],
    labels: &'a [usize],
    config: &'a DecisionTreeConfig,
    params: SplitParams,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let n_samples = sample_indices.len();
        let mut class_counts = vec![0usize; self.params.n_classes];
        for &si in sample_indices {
            class_counts[self.labels[si]] += 1;
        }
        let impurity = self.config.criterion.impurity(&class_counts, n_samples);

        let at_depth_limit = self.config.max_depth.is_some_and(|max| depth >= max);
        let stop = at_depth_limit || impurity.is_pure() || n_samples < self.config.min_samples_split;

        let split = if stop {
            None
        } else {
            find_best_split(
                self.columns,
                self.labels,
                sample_indices,
                self.params,
                &mut self.rng,
            )
        };

        let node_idx = self.arena.len();
        self.arena.push(Node::leaf(&class_counts, impurity));

        let Some(split) = split else {
            return NodeIndex::new(node_idx);
        };

        let left = self.grow(&split.left_indices, depth + 1);
        let right = self.grow(&split.right_indices, depth + 1);

        self.arena[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            impurity_decrease: split.impurity_decrease,
        };
        NodeIndex::new(node_idx)
    }
}

/// A fitted CART decision tree stored as a flat node arena.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        self.leaf_for(sample).map(|(prediction, _)| prediction)
    }

    /// Return the leaf class distribution for a single sample (length `n_classes`).
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], RfError> {
        self.leaf_for(sample).map(|(_, distribution)| distribution)
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.0.
    ///
    /// All zeros for a tree that is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Return the total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree. A lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0usize;
        let mut queue = VecDeque::from([(0usize, 0usize)]);
        while let Some((idx, d)) = queue.pop_front() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }
        max_depth
    }

    /// Walk from the root to the leaf that `sample` falls into.
    fn leaf_for(&self, sample: &[f64]) -> Result<(usize, &[f64]), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf {
                    prediction,
                    distribution,
                    ..
                } => return Ok((*prediction, distribution.as_slice())),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}
