//! Confusion matrix and per-class classification metrics.

use std::fmt;

use crate::error::RfError;

/// A confusion matrix for multi-class classification.
///
/// `matrix[true_class][predicted_class]` counts samples with label
/// `true_class` that were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassMetrics {
    /// The class index.
    pub class: usize,
    /// TP / (TP + FP), 0.0 when the class was never predicted.
    pub precision: f64,
    /// TP / (TP + FN), 0.0 when the class has no true samples.
    pub recall: f64,
    /// Harmonic mean of precision and recall, 0.0 when both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels provided |
    /// | [`RfError::LabelCountMismatch`] | The two label slices differ in length |
    /// | [`RfError::UnknownLabel`] | A label is `>= n_classes` |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: predicted.len(),
                n_labels: true_labels.len(),
            });
        }
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (sample_index, (&t, &p)) in true_labels.iter().zip(predicted).enumerate() {
            let label = t.max(p);
            if label >= n_classes {
                return Err(RfError::UnknownLabel {
                    label,
                    sample_index,
                    n_classes,
                });
            }
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Total number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted_as_c: usize = self.matrix.iter().map(|row| row[c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = ratio(tp, predicted_as_c);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Unweighted mean of the per-class F1 scores.
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        if self.n_classes == 0 {
            return 0.0;
        }
        self.class_metrics().iter().map(|m| m.f1).sum::<f64>() / self.n_classes as f64
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_classes {
            write!(f, " pred_{j:>3}")?;
        }
        writeln!(f)?;
        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "true_{i:>3}")?;
            for val in row {
                write!(f, " {val:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let labels = vec![0, 0, 1, 1, 2, 2];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, 3).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);
        assert!((cm.macro_f1() - 1.0).abs() < f64::EPSILON);
        assert_eq!(cm.total(), 6);
    }

    #[test]
    fn known_matrix_metrics() {
        // one miss per class, rotating
        let truth = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let predicted = vec![0, 0, 1, 1, 1, 2, 2, 2, 0];
        let cm = ConfusionMatrix::from_labels(&truth, &predicted, 3).unwrap();

        for m in cm.class_metrics() {
            assert!((m.precision - 2.0 / 3.0).abs() < 1e-10);
            assert!((m.recall - 2.0 / 3.0).abs() < 1e-10);
            assert_eq!(m.support, 3);
        }
        assert!((cm.accuracy() - 6.0 / 9.0).abs() < 1e-10);
        assert_eq!(cm.as_rows()[2], vec![1, 0, 2]);
    }

    #[test]
    fn never_predicted_class_has_zero_precision() {
        let cm = ConfusionMatrix::from_labels(&[0, 1, 1], &[0, 0, 0], 2).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[1].precision, 0.0);
        assert_eq!(metrics[1].recall, 0.0);
        assert_eq!(metrics[1].f1, 0.0);
        assert_eq!(metrics[1].support, 2);
    }

    #[test]
    fn input_errors() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[], 3),
            Err(RfError::EmptyDataset)
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0], 2),
            Err(RfError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0, 3], 2),
            Err(RfError::UnknownLabel { label: 3, sample_index: 1, .. })
        ));
    }

    #[test]
    fn display_has_headers() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2).unwrap();
        let output = cm.to_string();
        assert!(output.contains("pred_  1"));
        assert!(output.contains("true_  0"));
        assert_eq!(output.lines().count(), 3);
    }
}
