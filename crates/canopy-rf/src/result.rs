//! What `fit` hands back: the forest plus a summary of how it was grown.

use std::fmt;

use crate::forest::RandomForest;
use crate::importance::RankedFeature;

/// Summary of a finished training run, suitable for logging.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrainingMetadata {
    pub n_trees: usize,
    pub n_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    /// Features drawn per split after resolving [`crate::MaxFeatures`].
    pub max_features: usize,
    pub bootstrap: bool,
    pub seed: u64,
    /// Node count summed over every tree.
    pub total_nodes: usize,
    /// Deepest root-to-leaf path in the ensemble.
    pub max_depth: usize,
}

impl fmt::Display for TrainingMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trees on {}x{} ({} classes), {} features/split, bootstrap={}, seed={}, {} nodes, depth<={}",
            self.n_trees,
            self.n_samples,
            self.n_features,
            self.n_classes,
            self.max_features,
            self.bootstrap,
            self.seed,
            self.total_nodes,
            self.max_depth,
        )
    }
}

/// A fitted forest together with its ranked importances and run summary.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    pub(crate) fn new(
        forest: RandomForest,
        importances: Vec<RankedFeature>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            importances,
            metadata,
        }
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Drop the summary and keep only the model.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Split into owned model, importances and summary.
    #[must_use]
    pub fn into_parts(self) -> (RandomForest, Vec<RankedFeature>, TrainingMetadata) {
        (self.forest, self.importances, self.metadata)
    }

    /// Importances, most important first (`rank` 1 at index 0).
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    /// Names of the `k` most important features.
    #[must_use]
    pub fn top_features(&self, k: usize) -> Vec<&str> {
        self.importances
            .iter()
            .take(k)
            .map(|f| f.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RandomForestConfig;

    fn fit_small() -> super::RandomForestResult {
        let features = vec![
            vec![1.0, 0.3],
            vec![1.2, 0.1],
            vec![1.1, 0.2],
            vec![5.0, 0.2],
            vec![5.3, 0.1],
            vec![5.1, 0.3],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let names = vec!["signal".to_string(), "noise".to_string()];
        RandomForestConfig::new(8)
            .unwrap()
            .with_seed(3)
            .fit(&features, &labels, &names)
            .unwrap()
    }

    #[test]
    fn metadata_counts_every_tree() {
        let result = fit_small();
        let meta = result.metadata();
        let nodes: usize = (0..result.forest().n_trees())
            .map(|i| result.forest().trees[i].n_nodes())
            .sum();
        assert_eq!(meta.total_nodes, nodes);
        assert_eq!(meta.seed, 3);
        assert!(meta.bootstrap);
        assert!(meta.max_depth >= 1);
    }

    #[test]
    fn display_mentions_shape() {
        let text = fit_small().metadata().to_string();
        assert!(text.starts_with("8 trees on 6x2 (2 classes)"), "{text}");
    }

    #[test]
    fn top_features_and_parts() {
        let result = fit_small();
        assert_eq!(result.top_features(1), vec!["signal"]);
        assert_eq!(result.top_features(5).len(), 2);
        let (forest, importances, metadata) = result.into_parts();
        assert_eq!(forest.n_trees(), metadata.n_trees);
        assert_eq!(importances[0].rank, 1);
    }
}
