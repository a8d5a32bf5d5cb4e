//! Labelled CSV reader with full input validation.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::Dataset;

/// Parse a labelled CSV table into a [`Dataset`].
///
/// Expected format:
/// - Header row required: feature names followed by one label column
/// - `feature1,feature2,...,featureN,label`
/// - One row per sample, all rows with the same number of columns
///
/// Labels are mapped to class indices in order of first appearance, so the
/// first distinct label seen becomes class 0. `name` identifies the source
/// in errors and logs.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoFeatureColumns`] | Header has only a label column |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable float |
/// | [`IoError::MissingLabel`] | Label cell is empty |
#[instrument(skip(reader))]
pub fn parse_labelled_csv<R: Read>(name: &str, reader: R) -> Result<Dataset, IoError> {
    let csv_error = |e: csv::Error| IoError::CsvParse {
        dataset: name.to_string(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    };

    // flexible(true) lets rows of any width through so the explicit
    // InconsistentRowLength check reports them.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = rdr.headers().map_err(csv_error)?;
    let expected_cols = header.len();
    debug!(expected_cols, "read CSV header");
    if expected_cols < 2 {
        return Err(IoError::NoFeatureColumns {
            dataset: name.to_string(),
        });
    }
    let n_features = expected_cols - 1;
    let feature_names: Vec<String> = header.iter().take(n_features).map(String::from).collect();

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut target_names: Vec<String> = Vec::new();
    let mut class_of: HashMap<String, usize> = HashMap::new();

    for (row_index, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_error)?;
        if record.len() != expected_cols {
            return Err(IoError::InconsistentRowLength {
                dataset: name.to_string(),
                row_index,
                expected: expected_cols,
                got: record.len(),
            });
        }

        let mut row = Vec::with_capacity(n_features);
        for (col_index, raw) in record.iter().take(n_features).enumerate() {
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| IoError::NonFiniteValue {
                    dataset: name.to_string(),
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
            row.push(value);
        }

        let label = record.get(n_features).unwrap_or("");
        if label.is_empty() {
            return Err(IoError::MissingLabel {
                dataset: name.to_string(),
                row_index,
            });
        }
        let class = match class_of.get(label) {
            Some(&class) => class,
            None => {
                let class = target_names.len();
                class_of.insert(label.to_string(), class);
                target_names.push(label.to_string());
                class
            }
        };

        features.push(row);
        labels.push(class);
    }

    if labels.is_empty() {
        return Err(IoError::EmptyDataset {
            dataset: name.to_string(),
        });
    }

    info!(
        n_samples = labels.len(),
        n_features,
        n_classes = target_names.len(),
        "dataset loaded"
    );

    Ok(Dataset::new(
        name.to_string(),
        feature_names,
        target_names,
        features,
        labels,
    ))
}

/// Reads a labelled CSV file from disk.
///
/// See [`parse_labelled_csv`] for the format and validation rules. The
/// dataset is named after the file path.
pub struct LabelledCsvReader {
    path: PathBuf,
}

impl LabelledCsvReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] if the file cannot be opened, or any
    /// error of [`parse_labelled_csv`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        parse_labelled_csv(&self.path.display().to_string(), file)
    }
}
