//! Seeded train/test row split

use crate::error::{Result, SalaryError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of a shuffled train/test split
#[derive(Debug, Clone)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `n_samples` row indices with a seeded RNG and carve off
/// `test_fraction` of them as the held-out set.
pub fn train_test_split(n_samples: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    // An empty held-out set can never evaluate anything
    if test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(SalaryError::ValidationError(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let test_size = (n_samples as f64 * test_fraction) as usize;
    if test_size == 0 || test_size == n_samples {
        return Err(SalaryError::ValidationError(format!(
            "cannot split {} samples with test_fraction {}",
            n_samples, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices[..test_size].to_vec();
    let train = indices[test_size..].to_vec();

    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(50, 0.3, 1).unwrap();
        let all: HashSet<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn test_split_deterministic_per_seed() {
        let a = train_test_split(200, 0.2, 42).unwrap();
        let b = train_test_split(200, 0.2, 42).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);

        let c = train_test_split(200, 0.2, 43).unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_degenerate_splits_rejected() {
        assert!(train_test_split(0, 0.2, 42).is_err());
        assert!(train_test_split(3, 0.2, 42).is_err()); // test set would be empty
        assert!(train_test_split(10, 1.0, 42).is_err());
    }

    #[test]
    fn test_zero_fraction_rejected() {
        assert!(matches!(
            train_test_split(100, 0.0, 42),
            Err(SalaryError::ValidationError(_))
        ));
    }
}
