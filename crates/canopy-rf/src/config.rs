//! Configuration builder for random forest training.

use crate::error::RfError;
use crate::result::RandomForestResult;
use crate::split::SplitCriterion;

/// Number of features to draw at each split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`.
    Sqrt,
    /// `ceil(log2(n_features))`, at least 1.
    Log2,
    /// `ceil(fraction * n_features)`, fraction in (0.0, 1.0].
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// All features.
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count for a dataset with `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] when the count falls outside
    /// `[1, n_features]`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let n = n_features as f64;
        let resolved = match self {
            MaxFeatures::Sqrt => n.sqrt().ceil() as usize,
            MaxFeatures::Log2 => n.log2().ceil().max(1.0) as usize,
            MaxFeatures::Fraction(f) => (n * f).ceil() as usize,
            MaxFeatures::Fixed(count) => count,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`] or [`Default`], then chain
/// `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default     |
/// |---------------------|-------------|
/// | `max_features`      | `Sqrt`      |
/// | `max_depth`         | `None`      |
/// | `min_samples_split` | 2           |
/// | `min_samples_leaf`  | 1           |
/// | `criterion`         | `Gini`      |
/// | `bootstrap`         | `true`      |
/// | `n_classes`         | `None`      |
/// | `seed`              | 42          |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) bootstrap: bool,
    pub(crate) n_classes: Option<usize>,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Default ensemble size.
    pub const DEFAULT_N_TREES: usize = 100;

    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            ..Self::default()
        })
    }

    /// Set the max features strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
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

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Train each tree on a bootstrap sample (`true`) or on the full data.
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Fix the number of classes the forest votes over.
    ///
    /// `None` infers it from the largest training label. A value smaller
    /// than that is raised to fit, so a class absent from the training rows
    /// still gets a column in every probability vector.
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

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the max features strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return whether trees are trained on bootstrap samples.
    #[must_use]
    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    /// Return the fixed class count, if any.
    #[must_use]
    pub fn n_classes(&self) -> Option<usize> {
        self.n_classes
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a random forest.
    ///
    /// `features[sample_idx][feature_idx]` is row-major, `labels` holds
    /// zero-based class indices and `feature_names` names every column.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                             |
    /// |--------------------------------------|--------------------------------------------------|
    /// | [`RfError::EmptyDataset`]            | `features` is empty                              |
    /// | [`RfError::ZeroFeatures`]            | rows have zero feature columns                   |
    /// | [`RfError::LabelCountMismatch`]      | `labels.len() != features.len()`                 |
    /// | [`RfError::FeatureNameMismatch`]     | `feature_names.len() != n_features`              |
    /// | [`RfError::FeatureCountMismatch`]    | rows have inconsistent lengths                   |
    /// | [`RfError::NonFiniteValue`]          | any value is NaN or infinite                     |
    /// | [`RfError::InvalidMaxFeatures`]      | resolved max_features is outside [1, n_features] |
    /// | Tree hyperparameter variants         | invalid depth / split / leaf settings            |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        feature_names: &[String],
    ) -> Result<RandomForestResult, RfError> {
        crate::forest::train(self, features, labels, feature_names)
    }
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: Self::DEFAULT_N_TREES,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            bootstrap: true,
            n_classes: None,
            seed: 42,
        }
    }
}
