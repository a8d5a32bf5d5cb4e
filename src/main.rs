mod config;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use canopy_io::{ArtifactWriter, Dataset, TestSize, TrainTestSplit, load_iris, train_test_split};
use canopy_rf::{RandomForest, RandomForestConfig, RandomForestResult};

use crate::config::{RunConfig, SEED};

fn load_data() -> Result<Dataset> {
    load_iris().context("failed to load iris dataset")
}

fn split_data(dataset: &Dataset) -> Result<TrainTestSplit> {
    train_test_split(dataset, TestSize::default(), SEED).context("failed to split dataset")
}

fn train_model(train: &Dataset) -> Result<RandomForestResult> {
    RandomForestConfig::default()
        .with_seed(SEED)
        .with_n_classes(Some(train.n_classes()))
        .fit(train.features(), train.labels(), train.feature_names())
        .context("model training failed")
}

fn save_model(forest: &RandomForest, writer: &ArtifactWriter) -> Result<()> {
    let path = writer
        .prepare_model_path()
        .context("failed to prepare model path")?;
    forest
        .save(&path)
        .with_context(|| format!("failed to save model to {}", path.display()))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig::from_env()?;
    info!(
        model = %config.model_name,
        output_dir = %config.output_dir.display(),
        seed = SEED,
        "starting training run"
    );

    let dataset = load_data()?;
    let split = split_data(&dataset)?;
    let result = train_model(&split.train)?;
    info!(summary = %result.metadata(), "model trained");
    let forest = result.forest();

    let train_score = forest
        .score(split.train.features(), split.train.labels())
        .context("scoring on train set failed")?;
    let test_score = forest
        .score(split.test.features(), split.test.labels())
        .context("scoring on test set failed")?;
    // Debug formatting keeps the trailing ".0" on whole scores.
    println!("Train score: {train_score:?}");
    println!("Test score: {test_score:?}");

    let writer = ArtifactWriter::new(&config.output_dir, config.model_name.clone())?;
    save_model(forest, &writer)?;

    let evaluation = forest
        .evaluate(split.test.features(), split.test.labels())
        .context("evaluation on test set failed")?;
    writer
        .write_metrics(
            &split,
            train_score,
            test_score,
            &evaluation,
            result.importances(),
        )
        .context("failed to write metrics")?;

    info!(path = %writer.model_path().display(), "training run complete");
    Ok(())
}
