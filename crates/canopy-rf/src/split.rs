//! Impurity criteria and the exact best-split search over sorted columns.

use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node has zero impurity.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let proportions = class_counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value)
    }
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n·I(parent) - n_l·I(left) - n_r·I(right)`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Split search parameters that stay fixed for a whole tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitParams {
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

/// Draw `take` distinct feature indices out of `n_features` (partial Fisher-Yates).
fn sample_features(n_features: usize, take: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n_features).collect();
    let take = take.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

/// Find the best exact CART split among a random subset of features.
///
/// `columns` is column-major: `columns[feature][sample]`. Each candidate
/// feature is sorted once and scanned left to right with incremental class
/// counts; thresholds sit halfway between adjacent distinct values.
///
/// Returns `None` when no candidate separates the samples while keeping at
/// least `min_samples_leaf` on each side.
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    params: SplitParams,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples < 2 || columns.is_empty() {
        return None;
    }

    let mut parent_counts = vec![0usize; params.n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent = params.criterion.impurity(&parent_counts, n_samples).value();

    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(FeatureIndex, f64)> = None;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n_samples);

    for feat_idx in sample_features(columns.len(), params.max_features, rng) {
        let column = &columns[feat_idx];
        sorted.clear();
        sorted.extend(sample_indices.iter().map(|&si| (column[si], labels[si])));
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0usize; params.n_classes];
        let mut right_counts = parent_counts.clone();

        for i in 0..n_samples - 1 {
            let (value, class) = sorted[i];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next = sorted[i + 1].0;
            if value == next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let decrease = n_samples as f64 * parent
                - n_left as f64 * params.criterion.impurity(&left_counts, n_left).value()
                - n_right as f64 * params.criterion.impurity(&right_counts, n_right).value();

            if decrease > best_decrease {
                // adjacent floats can round the midpoint up to `next`
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best_decrease = decrease;
                best = Some((FeatureIndex::new(feat_idx), threshold));
            }
        }
    }

    let (feature, threshold) = best?;
    let column = &columns[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .copied()
        .partition(|&si| column[si] <= threshold);

    Some(SplitResult {
        feature,
        threshold,
        impurity_decrease: best_decrease,
        left_indices,
        right_indices,
    })
}
