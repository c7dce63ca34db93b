//! Core traits for windowed estimators
//!
//! Every estimator implements the base [`WindowedEstimator`] trait, with
//! specialized traits for the statistics it derives from its window.

use core::fmt::Debug;

/// Error raised by tracker construction or insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// Window capacity or observation dimension is zero
    #[error(
        "invalid configuration: capacity {capacity} and dimension {dimension} must both be positive"
    )]
    InvalidConfiguration { capacity: usize, dimension: usize },
    /// Observation length does not match the configured dimension
    #[error("invalid input: expected {expected} components, found {found}")]
    InvalidInput { expected: usize, found: usize },
}

/// Core trait for all sliding-window estimators
pub trait WindowedEstimator: Clone + Debug {
    /// The type of observation this estimator accepts
    type Item: ?Sized;

    /// Add an observation, returning the fraction of the window now in use
    ///
    /// A rejected observation leaves the estimator untouched.
    fn update(&mut self, item: &Self::Item) -> Result<f64, TrackerError>;

    /// Maximum number of observations retained
    fn capacity(&self) -> usize;

    /// Number of observations currently in the window
    fn len(&self) -> usize;

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Fraction of the window populated with observations (0.0 to 1.0)
    fn usage_fraction(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Check if no observation has been added yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if further observations will overwrite old ones
    fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

/// Estimators of the mean vector and covariance matrix of a window
///
/// Statistics may be computed lazily, so the accessors take `&mut self`.
pub trait CovarianceEstimator: WindowedEstimator {
    /// Mean vector type
    type Mean;
    /// Covariance matrix type
    type Covariance;

    /// Number of components per observation
    fn dimension(&self) -> usize;

    /// Column-wise mean of the window (zero when empty)
    fn mean(&mut self) -> Self::Mean;

    /// Sample covariance of the window (zero with fewer than two observations)
    fn covariance(&mut self) -> Self::Covariance;
}
