//! Artifact paths and JSON metrics output.

use std::fs;
use std::path::{Path, PathBuf};

use canopy_rf::{ConfusionMatrix, RankedFeature};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ModelName, TrainTestSplit};

/// Locates and writes the artifacts of a training run.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{model}.pkl` (the model, written by the caller
/// through [`ArtifactWriter::model_path`]) and `{model}_metrics.json`.
pub struct ArtifactWriter {
    output_dir: PathBuf,
    model_name: ModelName,
}

impl ArtifactWriter {
    /// Create a new writer targeting the given directory and model name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), model = %model_name))]
    pub fn new(output_dir: &Path, model_name: ModelName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            model_name,
        })
    }

    /// Return the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Return the model name.
    #[must_use]
    pub fn model_name(&self) -> &ModelName {
        &self.model_name
    }

    /// Return the path where the model binary should be saved.
    ///
    /// Does not write anything, just computes `{output_dir}/{model}.pkl`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.pkl", self.model_name.as_str()))
    }

    /// Return the path of the metrics document, `{output_dir}/{model}_metrics.json`.
    #[must_use]
    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_metrics.json", self.model_name.as_str()))
    }

    /// Remove any artifact left at [`ArtifactWriter::model_path`] by an
    /// earlier run and return the path, ready to be written.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::RemoveFile`] if an existing file cannot be removed.
    #[instrument(skip(self))]
    pub fn prepare_model_path(&self) -> Result<PathBuf, IoError> {
        let path = self.model_path();
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed previous model artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(IoError::RemoveFile {
                    path,
                    source: e,
                });
            }
        }
        Ok(path)
    }

    /// Write run metrics to `{model}_metrics.json`.
    ///
    /// `evaluation` is the confusion matrix on the test side of `split`;
    /// class names come from the split's datasets.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::EncodeJson`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | File write failed |
    #[instrument(skip_all)]
    pub fn write_metrics(
        &self,
        split: &TrainTestSplit,
        train_score: f64,
        test_score: f64,
        evaluation: &ConfusionMatrix,
        importances: &[RankedFeature],
    ) -> Result<PathBuf, IoError> {
        let path = self.metrics_path();
        let target_names = split.test.target_names();

        let class_metrics: Vec<ClassEntry> = evaluation
            .class_metrics()
            .into_iter()
            .map(|m| ClassEntry {
                class: m.class,
                name: target_names.get(m.class).map(String::as_str),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();

        let feature_importances: Vec<FeatureEntry> = importances
            .iter()
            .map(|f| FeatureEntry {
                name: f.name.as_str(),
                importance: f.importance,
                rank: f.rank,
            })
            .collect();

        let artifact = MetricsArtifact {
            model: self.model_name.as_str(),
            dataset: split.train.name(),
            n_train: split.train.n_samples(),
            n_test: split.test.n_samples(),
            train_score,
            test_score,
            macro_f1: evaluation.macro_f1(),
            confusion_matrix: evaluation.as_rows(),
            class_metrics,
            feature_importances,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::EncodeJson {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "metrics written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct MetricsArtifact<'a> {
    model: &'a str,
    dataset: &'a str,
    n_train: usize,
    n_test: usize,
    train_score: f64,
    test_score: f64,
    macro_f1: f64,
    confusion_matrix: &'a [Vec<usize>],
    class_metrics: Vec<ClassEntry<'a>>,
    feature_importances: Vec<FeatureEntry<'a>>,
}

#[derive(Serialize)]
struct ClassEntry<'a> {
    class: usize,
    name: Option<&'a str>,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct FeatureEntry<'a> {
    name: &'a str,
    importance: f64,
    rank: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TestSize, load_iris, train_test_split};
    use canopy_rf::RandomForestConfig;
    use tempfile::TempDir;

    fn writer(dir: &Path, name: &str) -> ArtifactWriter {
        ArtifactWriter::new(dir, ModelName::new(name.into()).unwrap()).unwrap()
    }

    #[test]
    fn paths_use_model_name() {
        let dir = TempDir::new().unwrap();
        let w = writer(dir.path(), "randomforest");
        assert_eq!(w.model_path(), dir.path().join("randomforest.pkl"));
        assert_eq!(w.metrics_path(), dir.path().join("randomforest_metrics.json"));
        assert_eq!(w.model_name().as_str(), "randomforest");
    }

    #[test]
    fn dotted_model_name_keeps_its_suffix() {
        let dir = TempDir::new().unwrap();
        let w = writer(dir.path(), "rf.v2");
        assert_eq!(w.model_path(), dir.path().join("rf.v2.pkl"));
        assert_eq!(w.metrics_path(), dir.path().join("rf.v2_metrics.json"));
    }

    #[test]
    fn new_creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("outputs").join("deep");
        let w = writer(&nested, "m");
        assert!(nested.is_dir());
        assert_eq!(w.output_dir(), nested.as_path());
    }

    #[test]
    fn new_fails_when_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("outputs");
        fs::write(&blocker, b"not a directory").unwrap();
        let result = ArtifactWriter::new(&blocker, ModelName::default());
        assert!(matches!(result, Err(IoError::OutputDirCreate { .. })));
    }

    #[test]
    fn prepare_model_path_removes_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let w = writer(dir.path(), "old");
        fs::write(w.model_path(), b"stale").unwrap();
        let path = w.prepare_model_path().unwrap();
        assert_eq!(path, w.model_path());
        assert!(!path.exists());
    }

    #[test]
    fn prepare_model_path_without_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let w = writer(dir.path(), "fresh");
        assert!(!w.prepare_model_path().unwrap().exists());
    }

    #[test]
    fn write_metrics_json_structure() {
        let dir = TempDir::new().unwrap();
        let w = writer(dir.path(), "metrics_test");

        let iris = load_iris().unwrap();
        let split = train_test_split(&iris, TestSize::default(), 123).unwrap();
        let result = RandomForestConfig::new(10)
            .unwrap()
            .with_seed(123)
            .fit(split.train.features(), split.train.labels(), split.train.feature_names())
            .unwrap();
        let forest = result.forest();
        let train_score = forest.score(split.train.features(), split.train.labels()).unwrap();
        let test_score = forest.score(split.test.features(), split.test.labels()).unwrap();
        let cm = forest.evaluate(split.test.features(), split.test.labels()).unwrap();

        let path = w
            .write_metrics(&split, train_score, test_score, &cm, result.importances())
            .unwrap();
        assert_eq!(path, dir.path().join("metrics_test_metrics.json"));

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["model"], "metrics_test");
        assert_eq!(content["dataset"], "iris");
        assert_eq!(content["n_train"], 112);
        assert_eq!(content["n_test"], 38);
        assert!(content["train_score"].is_number());
        assert!(content["test_score"].is_number());
        assert_eq!(content["confusion_matrix"].as_array().unwrap().len(), 3);

        let classes = content["class_metrics"].as_array().unwrap();
        assert_eq!(classes.len(), 3);
        assert_eq!(classes[0]["name"], "setosa");
        assert_eq!(classes[2]["name"], "virginica");
        let support: u64 = classes.iter().map(|c| c["support"].as_u64().unwrap()).sum();
        assert_eq!(support, 38);

        let features = content["feature_importances"].as_array().unwrap();
        assert_eq!(features.len(), 4);
        assert_eq!(features[0]["rank"], 1);
    }
}
