//! Domain types for canopy-io.

use crate::IoError;

/// A validated model name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName(String);

impl ModelName {
    /// Name used when none is configured.
    pub const DEFAULT: &'static str = "randomforest";

    /// Parse and validate a model name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidModelName`] unless the name is a single
    /// file name component: non-empty, not `.` or `..`, and free of `/`,
    /// `\` and NUL.
    pub fn new(name: String) -> Result<Self, IoError> {
        if matches!(name.as_str(), "" | "." | "..") || name.contains(['/', '\\', '\0']) {
            return Err(IoError::InvalidModelName { name });
        }
        Ok(Self(name))
    }

    /// Return the model name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labelled tabular dataset for classification.
///
/// Features and labels are parallel: `labels[i]` is the class index of
/// `features[i]`, and `target_names[labels[i]]` its class name.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    feature_names: Vec<String>,
    target_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Dataset {
    pub(crate) fn new(
        name: String,
        feature_names: Vec<String>,
        target_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        debug_assert!(labels.iter().all(|&l| l < target_names.len()));
        Self {
            name,
            feature_names,
            target_names,
            features,
            labels,
        }
    }

    /// Rows at `indices`, in that order. Names are carried over unchanged.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            feature_names: self.feature_names.clone(),
            target_names: self.target_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Return the dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the class names, indexed by label.
    #[must_use]
    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the label vector.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.target_names.len()
    }

    /// Number of samples per class, indexed by label.
    #[must_use]
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

/// The two sides of a shuffled train/test split.
///
/// `train_indices[i]` is the row of the source dataset that became row `i`
/// of `train`; likewise for `test_indices`.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Training rows.
    pub train: Dataset,
    /// Held-out rows.
    pub test: Dataset,
    /// Source row indices of `train`.
    pub train_indices: Vec<usize>,
    /// Source row indices of `test`.
    pub test_indices: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Dataset {
        Dataset::new(
            "toy".into(),
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![0, 1, 1],
        )
    }

    #[test]
    fn model_name_valid() {
        let name = ModelName::new("random-forest_01".to_string());
        assert_eq!(name.unwrap().as_str(), "random-forest_01");
    }

    #[test]
    fn model_name_default() {
        assert_eq!(ModelName::default().as_str(), "randomforest");
    }

    #[test]
    fn model_name_rejects_empty() {
        let name = ModelName::new(String::new());
        assert!(matches!(name, Err(IoError::InvalidModelName { .. })));
    }

    #[test]
    fn model_name_rejects_path_components() {
        for bad in [".", "..", "../model", "a/b", "a\\b", "/abs", "nul\0byte"] {
            let name = ModelName::new(bad.to_string());
            assert!(matches!(name, Err(IoError::InvalidModelName { .. })), "{bad}");
        }
    }

    #[test]
    fn model_name_accepts_any_single_file_name() {
        for good in ["rf.v2", "iris model", "model@2024", "..hidden", "m.pkl"] {
            let name = ModelName::new(good.to_string()).unwrap();
            assert_eq!(name.as_str(), good);
        }
    }

    #[test]
    fn select_reorders_rows() {
        let ds = toy().select(&[2, 0]);
        assert_eq!(ds.n_samples(), 2);
        assert_eq!(ds.features()[0], vec![5.0, 6.0]);
        assert_eq!(ds.labels(), &[1, 0]);
        assert_eq!(ds.target_names(), &["x", "y"]);
    }

    #[test]
    fn class_counts_per_label() {
        assert_eq!(toy().class_counts(), vec![1, 2]);
    }
}
