//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::importance::aggregate_importances;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig};
use crate::validate::{infer_n_classes, validate_training_data};

/// A fitted random forest ensemble.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Draw `n_samples` row indices with replacement.
fn bootstrap_sample(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Train the ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    let shape = validate_training_data(features, labels)?;
    if feature_names.len() != shape.n_features {
        return Err(RfError::FeatureNameMismatch {
            expected: shape.n_features,
            got: feature_names.len(),
        });
    }
    let max_features = config.max_features.resolve(shape.n_features)?;
    let n_classes = config.n_classes.unwrap_or(0).max(infer_n_classes(labels));

    info!(
        n_trees = config.n_trees,
        n_samples = shape.n_samples,
        n_features = shape.n_features,
        n_classes,
        max_features,
        bootstrap = config.bootstrap,
        "training random forest"
    );

    let tree_config = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features))
        .with_n_classes(Some(n_classes));

    // Seeds are drawn up front so results do not depend on thread scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();
    let bootstrap = config.bootstrap;

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tree_config = tree_config.clone().with_seed(rng.r#gen());
            if !bootstrap {
                return tree_config.fit(features, labels);
            }
            let drawn = bootstrap_sample(shape.n_samples, &mut rng);
            let boot_features: Vec<Vec<f64>> =
                drawn.iter().map(|&i| features[i].clone()).collect();
            let boot_labels: Vec<usize> = drawn.iter().map(|&i| labels[i]).collect();
            tree_config.fit(&boot_features, &boot_labels)
        })
        .collect::<Result<_, _>>()?;

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    let forest = RandomForest {
        trees,
        n_features: shape.n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features: shape.n_features,
        n_classes,
        n_samples: shape.n_samples,
        max_features,
        bootstrap,
        seed: config.seed,
        total_nodes: forest.trees.iter().map(DecisionTree::n_nodes).sum(),
        max_depth: forest.trees.iter().map(DecisionTree::depth).max().unwrap_or(0),
    };

    info!(
        total_nodes = metadata.total_nodes,
        max_depth = metadata.max_depth,
        "random forest training complete"
    );

    Ok(RandomForestResult::new(forest, importances, metadata))
}
