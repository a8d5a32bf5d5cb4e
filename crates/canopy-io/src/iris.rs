//! The bundled Iris flower dataset.

use tracing::instrument;

use crate::IoError;
use crate::domain::Dataset;
use crate::reader::parse_labelled_csv;

const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// Load Fisher's Iris dataset.
///
/// 150 samples, 4 features (`sepal_length`, `sepal_width`, `petal_length`,
/// `petal_width`, in cm) and 3 classes (`setosa` = 0, `versicolor` = 1,
/// `virginica` = 2), 50 samples each. Rows 35 and 38 carry the corrected
/// measurements used by most distributed copies.
///
/// # Errors
///
/// Only fails if the bundled table is corrupt; see [`parse_labelled_csv`].
#[instrument]
pub fn load_iris() -> Result<Dataset, IoError> {
    parse_labelled_csv("iris", IRIS_CSV.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iris_shape() {
        let ds = load_iris().unwrap();
        assert_eq!(ds.name(), "iris");
        assert_eq!(ds.n_samples(), 150);
        assert_eq!(ds.n_features(), 4);
        assert_eq!(
            ds.feature_names(),
            &["sepal_length", "sepal_width", "petal_length", "petal_width"]
        );
        assert_eq!(ds.target_names(), &["setosa", "versicolor", "virginica"]);
        assert_eq!(ds.class_counts(), vec![50, 50, 50]);
    }

    #[test]
    fn iris_labels_are_grouped_by_class() {
        let ds = load_iris().unwrap();
        assert!(ds.labels()[..50].iter().all(|&l| l == 0));
        assert!(ds.labels()[50..100].iter().all(|&l| l == 1));
        assert!(ds.labels()[100..].iter().all(|&l| l == 2));
    }

    #[test]
    fn iris_known_rows() {
        let ds = load_iris().unwrap();
        assert_eq!(ds.features()[0], vec![5.1, 3.5, 1.4, 0.2]);
        assert_eq!(ds.features()[34], vec![4.9, 3.1, 1.5, 0.2]);
        assert_eq!(ds.features()[37], vec![4.9, 3.6, 1.4, 0.1]);
        assert_eq!(ds.features()[149], vec![5.9, 3.0, 5.1, 1.8]);
    }

    #[test]
    fn iris_column_means() {
        let ds = load_iris().unwrap();
        let expected = [5.843_333, 3.057_333, 3.758, 1.199_333];
        for (col, &mean) in expected.iter().enumerate() {
            let got = ds.features().iter().map(|row| row[col]).sum::<f64>() / 150.0;
            assert!((got - mean).abs() < 1e-5, "column {col}: {got} != {mean}");
        }
    }
}
