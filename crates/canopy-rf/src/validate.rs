//! Input checks shared by tree and forest training.

use crate::error::RfError;

/// Shape of a validated training set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DataShape {
    pub(crate) n_samples: usize,
    pub(crate) n_features: usize,
}

/// Validate a row-major feature matrix and its labels.
///
/// Rejects empty input, zero-width rows, ragged rows, non-finite values and
/// a label vector whose length differs from the number of rows.
pub(crate) fn validate_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<DataShape, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(DataShape {
        n_samples: features.len(),
        n_features,
    })
}

/// Number of classes implied by a label vector (`max + 1`).
pub(crate) fn infer_n_classes(labels: &[usize]) -> usize {
    labels.iter().max().map_or(0, |&max| max + 1)
}

/// Convert row-major features into column-major layout.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect()
}
