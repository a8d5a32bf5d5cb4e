//! I/O error types for canopy-io.

use std::path::PathBuf;

/// Errors from dataset parsing, train/test splitting, and artifact output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in dataset \"{dataset}\" at byte offset {offset}")]
    CsvParse {
        /// Dataset name or source path.
        dataset: String,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV contains a header but zero data rows.
    #[error("empty dataset (no data rows) in \"{dataset}\"")]
    EmptyDataset {
        /// Dataset name or source path.
        dataset: String,
    },

    /// Returned when the header has no column besides the label column.
    #[error("no feature columns in \"{dataset}\": need at least one feature and a label column")]
    NoFeatureColumns {
        /// Dataset name or source path.
        dataset: String,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in \"{dataset}\": row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Dataset name or source path.
        dataset: String,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in \"{dataset}\": row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Dataset name or source path.
        dataset: String,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based feature column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the label cell of a row is empty.
    #[error("missing label in \"{dataset}\": row {row_index}")]
    MissingLabel {
        /// Dataset name or source path.
        dataset: String,
        /// Zero-based row index (excluding header).
        row_index: usize,
    },

    /// Returned when a test fraction is not strictly between 0 and 1.
    #[error("invalid test fraction {fraction}: must be in (0, 1)")]
    InvalidTestFraction {
        /// The rejected fraction.
        fraction: f64,
    },

    /// Returned when a test count is zero or leaves no training samples.
    #[error("invalid test count {n_test} for {n_samples} samples: must be in [1, {n_samples})")]
    InvalidTestCount {
        /// The rejected count.
        n_test: usize,
        /// Number of samples in the dataset.
        n_samples: usize,
    },

    /// Returned when a split would leave the train or test side empty.
    #[error("split of {n_samples} samples leaves an empty side: {n_train} train, {n_test} test")]
    EmptySplit {
        /// Number of samples in the dataset.
        n_samples: usize,
        /// Resulting train size.
        n_train: usize,
        /// Resulting test size.
        n_test: usize,
    },

    /// Returned when the model name is not a single file name component.
    #[error("invalid model name \"{name}\": must be a single file name without path separators")]
    InvalidModelName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an existing artifact cannot be removed before overwriting.
    #[error("cannot remove existing file {path}")]
    RemoveFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a metrics document cannot be encoded as JSON.
    #[error("cannot encode metrics for {path}")]
    EncodeJson {
        /// Destination path.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },
}
