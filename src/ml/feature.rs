//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentinelError};

/// A sparse vector of fixed dimension.
///
/// Entries are `(index, value)` pairs, strictly increasing by index, all
/// below `dimension`. Zero values may be omitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build a vector, validating the entry invariants.
    pub fn new(dimension: usize, entries: Vec<(usize, f64)>) -> Result<Self> {
        let mut previous: Option<usize> = None;
        for &(index, value) in &entries {
            if index >= dimension {
                return Err(SentinelError::invalid_argument(format!(
                    "feature index {index} out of range for dimension {dimension}"
                )));
            }
            if previous.is_some_and(|p| p >= index) {
                return Err(SentinelError::invalid_argument(
                    "feature indices must be strictly increasing",
                ));
            }
            if !value.is_finite() {
                return Err(SentinelError::invalid_argument(format!(
                    "feature {index} is not finite"
                )));
            }
            previous = Some(index);
        }
        Ok(FeatureVector { dimension, entries })
    }

    /// The all-zero vector.
    pub fn zeros(dimension: usize) -> Self {
        FeatureVector {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|&(_, v)| v == 0.0)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt()
    }

    /// Dot product with a dense weight vector of the same dimension.
    pub fn dot(&self, weights: &[f64]) -> Result<f64> {
        if weights.len() != self.dimension {
            return Err(SentinelError::invalid_argument(format!(
                "dimension mismatch: vector has {}, weights have {}",
                self.dimension,
                weights.len()
            )));
        }
        Ok(self.dot_unchecked(weights))
    }

    /// Dot product without the dimension check; indices must be in range.
    pub(crate) fn dot_unchecked(&self, weights: &[f64]) -> f64 {
        self.entries.iter().map(|&(i, v)| weights[i] * v).sum()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for &(i, v) in &self.entries {
            dense[i] = v;
        }
        dense
    }
}
