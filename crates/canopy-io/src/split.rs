//! Seeded shuffled train/test splitting.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::IoError;
use crate::domain::{Dataset, TrainTestSplit};

/// Size of the held-out side of a split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestSize {
    /// Proportion of samples, strictly between 0 and 1. Rounded up.
    Fraction(f64),
    /// Absolute number of samples.
    Count(usize),
}

impl TestSize {
    /// Held-out proportion used when none is given.
    pub const DEFAULT_FRACTION: f64 = 0.25;

    /// Resolve to a concrete test-set size for `n_samples` samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidTestFraction`] | Fraction outside `(0, 1)` or not finite |
    /// | [`IoError::InvalidTestCount`] | Count is 0 or `>= n_samples` |
    /// | [`IoError::EmptySplit`] | Rounding leaves either side empty |
    pub fn resolve(self, n_samples: usize) -> Result<usize, IoError> {
        let n_test = match self {
            TestSize::Fraction(fraction) => {
                if !(fraction > 0.0 && fraction < 1.0) {
                    return Err(IoError::InvalidTestFraction { fraction });
                }
                (fraction * n_samples as f64).ceil() as usize
            }
            TestSize::Count(n_test) => {
                if n_test == 0 || n_test >= n_samples {
                    return Err(IoError::InvalidTestCount { n_test, n_samples });
                }
                n_test
            }
        };
        if n_test == 0 || n_test >= n_samples {
            return Err(IoError::EmptySplit {
                n_samples,
                n_train: n_samples.saturating_sub(n_test),
                n_test,
            });
        }
        Ok(n_test)
    }
}

impl Default for TestSize {
    fn default() -> Self {
        TestSize::Fraction(Self::DEFAULT_FRACTION)
    }
}

/// Shuffle the rows of `dataset` and split them into train and test sets.
///
/// The row order is permuted with a [`ChaCha8Rng`] seeded from `seed`; the
/// first `n_test` permuted rows become the test set and the rest the
/// training set. Classes are not stratified. The same dataset, size and seed
/// always produce the same split.
///
/// # Errors
///
/// See [`TestSize::resolve`].
#[instrument(skip(dataset), fields(name = dataset.name(), n_samples = dataset.n_samples()))]
pub fn train_test_split(
    dataset: &Dataset,
    test_size: TestSize,
    seed: u64,
) -> Result<TrainTestSplit, IoError> {
    let n_samples = dataset.n_samples();
    let n_test = test_size.resolve(n_samples)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut permutation: Vec<usize> = (0..n_samples).collect();
    permutation.shuffle(&mut rng);
    let train_indices = permutation.split_off(n_test);
    let test_indices = permutation;

    debug!(
        n_train = train_indices.len(),
        n_test = test_indices.len(),
        "split drawn"
    );

    Ok(TrainTestSplit {
        train: dataset.select(&train_indices),
        test: dataset.select(&test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Dataset {
        Dataset::new(
            "numbered".into(),
            vec!["i".into()],
            vec!["even".into(), "odd".into()],
            (0..n).map(|i| vec![i as f64]).collect(),
            (0..n).map(|i| i % 2).collect(),
        )
    }

    #[test]
    fn default_fraction_rounds_test_side_up() {
        assert_eq!(TestSize::default().resolve(150).unwrap(), 38);
        assert_eq!(TestSize::default().resolve(4).unwrap(), 1);
        assert_eq!(TestSize::default().resolve(5).unwrap(), 2);
    }

    #[test]
    fn count_is_used_verbatim() {
        assert_eq!(TestSize::Count(10).resolve(150).unwrap(), 10);
    }

    #[test]
    fn invalid_fractions_rejected() {
        for fraction in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                TestSize::Fraction(fraction).resolve(10),
                Err(IoError::InvalidTestFraction { .. })
            ));
        }
    }

    #[test]
    fn invalid_counts_rejected() {
        assert!(matches!(
            TestSize::Count(0).resolve(10),
            Err(IoError::InvalidTestCount { .. })
        ));
        assert!(matches!(
            TestSize::Count(10).resolve(10),
            Err(IoError::InvalidTestCount { .. })
        ));
    }

    #[test]
    fn fraction_that_consumes_everything_is_empty_split() {
        assert!(matches!(
            TestSize::Fraction(0.9).resolve(1),
            Err(IoError::EmptySplit { n_train: 0, n_test: 1, .. })
        ));
    }

    #[test]
    fn split_partitions_all_rows() {
        let ds = numbered(20);
        let split = train_test_split(&ds, TestSize::default(), 123).unwrap();
        assert_eq!(split.train.n_samples(), 15);
        assert_eq!(split.test.n_samples(), 5);

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(&split.test_indices)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn split_rows_follow_indices() {
        let ds = numbered(20);
        let split = train_test_split(&ds, TestSize::Count(7), 9).unwrap();
        for (row, &src) in split.test.features().iter().zip(&split.test_indices) {
            assert_eq!(row[0], src as f64);
        }
        for (&label, &src) in split.train.labels().iter().zip(&split.train_indices) {
            assert_eq!(label, src % 2);
        }
    }

    #[test]
    fn same_seed_same_split() {
        let ds = numbered(50);
        let a = train_test_split(&ds, TestSize::default(), 123).unwrap();
        let b = train_test_split(&ds, TestSize::default(), 123).unwrap();
        assert_eq!(a.train_indices, b.train_indices);
        assert_eq!(a.test_indices, b.test_indices);
    }

    #[test]
    fn different_seed_different_split() {
        let ds = numbered(50);
        let a = train_test_split(&ds, TestSize::default(), 1).unwrap();
        let b = train_test_split(&ds, TestSize::default(), 2).unwrap();
        assert_ne!(a.test_indices, b.test_indices);
    }

    #[test]
    fn split_is_shuffled() {
        let ds = numbered(50);
        let split = train_test_split(&ds, TestSize::default(), 123).unwrap();
        assert_ne!(split.test_indices, (0..13).collect::<Vec<_>>());
    }
}
