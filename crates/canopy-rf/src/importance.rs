//! Feature importance aggregation across trees.

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score. Sums to 1.0 across all features, or is
    /// 0.0 everywhere when no tree made a split.
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Average per-tree MDI importances into ranked features.
///
/// Sums across trees, renormalizes, sorts descending (stable, so ties keep
/// column order) and assigns 1-based ranks.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    if per_tree.is_empty() || names.is_empty() {
        return Vec::new();
    }

    let mut totals = vec![0.0f64; names.len()];
    for tree in per_tree {
        for (total, &value) in totals.iter_mut().zip(tree) {
            *total += value;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}
