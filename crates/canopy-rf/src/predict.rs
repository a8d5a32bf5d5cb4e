//! Prediction and scoring for the random forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::forest::RandomForest;

/// Class probability distribution from a prediction.
#[derive(Debug, Clone)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the most probable class. Ties go to the lowest index.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        self.probs
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (class, &p)| {
                if p > best.1 { (class, p) } else { best }
            })
            .0
    }

    /// Return the top-k classes sorted by descending probability.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.probs.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k);
        indexed
    }

    /// Return the probability distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

impl RandomForest {
    /// Predict the class label for a single sample (argmax of the averaged
    /// tree distributions).
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Average the leaf distributions of every tree for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut avg = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (slot, p) in avg.iter_mut().zip(tree.predict_proba(sample)?) {
                *slot += p;
            }
        }
        let n = self.trees.len() as f64;
        avg.iter_mut().for_each(|v| *v /= n);

        Ok(ClassDistribution::new(avg))
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return probability distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Mean accuracy on the given samples, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | No samples |
    /// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`RfError::PredictionFeatureMismatch`] | A sample has the wrong width |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn score(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<f64, RfError> {
        check_eval_input(features, labels)?;
        let predictions = self.predict_batch(features)?;
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|&(p, l)| p == l)
            .count();
        let accuracy = correct as f64 / labels.len() as f64;
        debug!(correct, accuracy, "scored");
        Ok(accuracy)
    }

    /// Build a confusion matrix of predictions against `labels`.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::score`], plus [`RfError::UnknownLabel`] when a
    /// label is not one of the model's classes.
    pub fn evaluate(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<ConfusionMatrix, RfError> {
        check_eval_input(features, labels)?;
        if let Some((sample_index, &label)) =
            labels.iter().enumerate().find(|&(_, &l)| l >= self.n_classes)
        {
            return Err(RfError::UnknownLabel {
                label,
                sample_index,
                n_classes: self.n_classes,
            });
        }
        let predictions = self.predict_batch(features)?;
        ConfusionMatrix::from_labels(labels, &predictions, self.n_classes)
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

fn check_eval_input(features: &[Vec<f64>], labels: &[usize]) -> Result<(), RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    Ok(())
}
