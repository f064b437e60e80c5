//! Seeded train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{Result, SentinelError};

/// Shuffle with `seed` and cut off `ceil(test_size * n)` items for testing.
///
/// Returns `(train, test)`. The same seed always yields the same split.
pub fn train_test_split<T>(items: Vec<T>, test_size: f64, seed: u64) -> Result<(Vec<T>, Vec<T>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SentinelError::invalid_argument(format!(
            "test_size must lie strictly between 0 and 1, got {test_size}"
        )));
    }

    let n = items.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(SentinelError::training(format!(
            "cannot split {n} samples with test_size {test_size}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut is_test = vec![false; n];
    for &index in &order[..n_test] {
        is_test[index] = true;
    }

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (item, test_item) in items.into_iter().zip(is_test) {
        if test_item {
            test.push(item);
        } else {
            train.push(item);
        }
    }
    Ok((train, test))
}
