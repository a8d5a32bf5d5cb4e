use std::fmt;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a node inside a tree's node arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node impurity under the configured criterion.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return `true` when the node holds a single class.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self.0 <= 0.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Children are referenced by [`NodeIndex`], so a whole tree is a flat
/// `Vec<Node>` that serializes without pointer fix-ups. The root is always
/// at index 0.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature compared at this node.
        feature: FeatureIndex,
        /// Samples with `value <= threshold` go left.
        threshold: f64,
        /// Left child.
        left: NodeIndex,
        /// Right child.
        right: NodeIndex,
        /// Impurity before splitting.
        impurity: Impurity,
        /// Training samples that reached this node.
        n_samples: usize,
        /// Weighted impurity decrease contributed by this split.
        impurity_decrease: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Majority class.
        prediction: usize,
        /// Class frequencies of the training samples in this leaf.
        distribution: Vec<f64>,
        /// Impurity at this leaf.
        impurity: Impurity,
        /// Training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Build a leaf from raw class counts.
    pub(crate) fn leaf(class_counts: &[usize], impurity: Impurity) -> Self {
        let n_samples: usize = class_counts.iter().sum();
        let total = n_samples.max(1) as f64;
        let distribution = class_counts.iter().map(|&c| c as f64 / total).collect();
        // Ties resolve to the lowest class index.
        let prediction = class_counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (class, &count)| {
                if count > best.1 { (class, count) } else { best }
            })
            .0;
        Node::Leaf {
            prediction,
            distribution,
            impurity,
            n_samples,
        }
    }

    /// Return the impurity at this node (before splitting for interior nodes).
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
