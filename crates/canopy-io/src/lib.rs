//! Datasets, train/test splitting, and run artifacts for the canopy pipeline.

mod domain;
mod error;
mod iris;
mod reader;
mod split;
mod writer;

pub use domain::{Dataset, ModelName, TrainTestSplit};
pub use error::IoError;
pub use iris::load_iris;
pub use reader::{LabelledCsvReader, parse_labelled_csv};
pub use split::{TestSize, train_test_split};
pub use writer::ArtifactWriter;
