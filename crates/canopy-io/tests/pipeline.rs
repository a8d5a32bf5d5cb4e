//! End-to-end integration tests: Iris -> split -> train -> score -> artifacts.

use std::fs;

use canopy_io::{
    ArtifactWriter, ModelName, TestSize, load_iris, parse_labelled_csv, train_test_split,
};
use canopy_rf::{RandomForest, RandomForestConfig};
use tempfile::TempDir;

const SEED: u64 = 123;

#[test]
fn train_and_save_round_trip() {
    // 1. Load and split
    let iris = load_iris().expect("bundled dataset should parse");
    let split = train_test_split(&iris, TestSize::default(), SEED).unwrap();
    assert_eq!(split.train.n_samples(), 112);
    assert_eq!(split.test.n_samples(), 38);

    // 2. Train with the default tree count
    let result = RandomForestConfig::default()
        .with_seed(SEED)
        .fit(
            split.train.features(),
            split.train.labels(),
            split.train.feature_names(),
        )
        .unwrap();
    let forest = result.forest();
    assert_eq!(forest.n_trees(), 100);

    // 3. Score both sides
    let train_score = forest
        .score(split.train.features(), split.train.labels())
        .unwrap();
    let test_score = forest
        .score(split.test.features(), split.test.labels())
        .unwrap();
    assert!((0.0..=1.0).contains(&train_score));
    assert!((0.0..=1.0).contains(&test_score));

    // 4. Save into a fresh output directory
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("outputs");
    let writer = ArtifactWriter::new(&output_dir, ModelName::default()).unwrap();
    let model_path = writer.prepare_model_path().unwrap();
    forest.save(&model_path).unwrap();

    assert_eq!(model_path, output_dir.join("randomforest.pkl"));
    assert!(fs::metadata(&model_path).unwrap().len() > 0);

    // 5. Load back and verify identical predictions
    let loaded = RandomForest::load(&model_path).unwrap();
    assert_eq!(
        loaded.predict_batch(split.test.features()).unwrap(),
        forest.predict_batch(split.test.features()).unwrap()
    );
    let reloaded_score = loaded
        .score(split.test.features(), split.test.labels())
        .unwrap();
    assert!((reloaded_score - test_score).abs() < f64::EPSILON);
}

#[test]
fn iris_accuracy_regression() {
    let iris = load_iris().unwrap();
    let split = train_test_split(&iris, TestSize::default(), SEED).unwrap();
    let forest = RandomForestConfig::default()
        .with_seed(SEED)
        .fit(
            split.train.features(),
            split.train.labels(),
            split.train.feature_names(),
        )
        .unwrap()
        .into_forest();

    let train_score = forest
        .score(split.train.features(), split.train.labels())
        .unwrap();
    let test_score = forest
        .score(split.test.features(), split.test.labels())
        .unwrap();
    assert!(train_score >= 0.95, "train score {train_score} < 0.95");
    assert!(test_score >= 0.85, "test score {test_score} < 0.85");
}

#[test]
fn split_is_deterministic_for_fixed_seed() {
    let iris = load_iris().unwrap();
    let a = train_test_split(&iris, TestSize::default(), SEED).unwrap();
    let b = train_test_split(&iris, TestSize::default(), SEED).unwrap();
    assert_eq!(a.train_indices, b.train_indices);
    assert_eq!(a.test_indices, b.test_indices);
    assert_eq!(a.test.labels(), b.test.labels());
}

#[test]
fn rerun_overwrites_model_artifact() {
    let iris = load_iris().unwrap();
    let split = train_test_split(&iris, TestSize::default(), SEED).unwrap();
    let dir = TempDir::new().unwrap();
    let name = ModelName::new("rerun".into()).unwrap();
    let writer = ArtifactWriter::new(dir.path(), name).unwrap();

    let mut sizes = Vec::new();
    for n_trees in [20, 5] {
        let forest = RandomForestConfig::new(n_trees)
            .unwrap()
            .with_seed(SEED)
            .fit(
                split.train.features(),
                split.train.labels(),
                split.train.feature_names(),
            )
            .unwrap()
            .into_forest();
        let path = writer.prepare_model_path().unwrap();
        forest.save(&path).unwrap();
        sizes.push(fs::metadata(&path).unwrap().len());
    }

    // the second, smaller forest replaced the first
    assert!(sizes[1] < sizes[0]);
    let loaded = RandomForest::load(writer.model_path()).unwrap();
    assert_eq!(loaded.n_trees(), 5);
}

#[test]
fn metrics_written_alongside_model() {
    let iris = load_iris().unwrap();
    let split = train_test_split(&iris, TestSize::default(), SEED).unwrap();
    let result = RandomForestConfig::new(25)
        .unwrap()
        .with_seed(SEED)
        .fit(
            split.train.features(),
            split.train.labels(),
            split.train.feature_names(),
        )
        .unwrap();
    let forest = result.forest();
    let train_score = forest
        .score(split.train.features(), split.train.labels())
        .unwrap();
    let test_score = forest
        .score(split.test.features(), split.test.labels())
        .unwrap();
    let cm = forest
        .evaluate(split.test.features(), split.test.labels())
        .unwrap();

    let dir = TempDir::new().unwrap();
    let writer = ArtifactWriter::new(dir.path(), ModelName::default()).unwrap();
    let path = writer
        .write_metrics(&split, train_score, test_score, &cm, result.importances())
        .unwrap();

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(content["model"], "randomforest");
    assert!((content["test_score"].as_f64().unwrap() - test_score).abs() < 1e-12);

    let importance_sum: f64 = content["feature_importances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["importance"].as_f64().unwrap())
        .sum();
    assert!((importance_sum - 1.0).abs() < 1e-9);
}

#[test]
fn rare_class_in_test_split_still_evaluates() {
    // 40 rows of two common classes and a single row of a third.
    let mut csv = String::from("x,y,label\n");
    for i in 0..20 {
        csv.push_str(&format!("{i}.0,1.0,a\n"));
        csv.push_str(&format!("{i}.0,9.0,b\n"));
    }
    csv.push_str("10.0,5.0,c\n");
    let dataset = parse_labelled_csv("rare", csv.as_bytes()).unwrap();
    assert_eq!(dataset.n_classes(), 3);

    let mut rare_row_tested = false;
    for seed in 0..32 {
        let split = train_test_split(&dataset, TestSize::default(), seed).unwrap();
        rare_row_tested |= split.test.labels().contains(&2);

        let result = RandomForestConfig::new(10)
            .unwrap()
            .with_seed(seed)
            .with_n_classes(Some(split.train.n_classes()))
            .fit(
                split.train.features(),
                split.train.labels(),
                split.train.feature_names(),
            )
            .unwrap();
        let evaluation = result
            .forest()
            .evaluate(split.test.features(), split.test.labels())
            .unwrap();
        assert_eq!(evaluation.n_classes(), 3, "seed {seed}");
    }
    assert!(rare_row_tested);
}
