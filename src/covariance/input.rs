//! Input adapters
//!
//! Convenience entry points accepting observations in other shapes. Each one
//! only validates the length and converts to `f64` before handing the point
//! to the tracker's single insertion path.

use nalgebra::{Scalar, SVector};
use num_traits::AsPrimitive;

use super::tracker::WindowedCovariance;
use crate::traits::TrackerError;

impl<T, const D: usize> WindowedCovariance<T, D>
where
    T: AsPrimitive<f64>,
{
    /// Add an observation given as a fixed-length array
    ///
    /// The length is checked by the type system, so this cannot fail.
    pub fn add_array(&mut self, point: [T; D]) -> f64 {
        self.insert(&SVector::from_fn(|i, _| point[i].as_()))
    }

    /// Add an observation given as a variable-length slice
    ///
    /// Same as [`add_observation`](Self::add_observation).
    pub fn add_slice(&mut self, point: &[T]) -> Result<f64, TrackerError> {
        self.add_observation(point)
    }

    /// Add an observation given as an `nalgebra` column vector
    pub fn add_vector(&mut self, point: &SVector<T, D>) -> f64
    where
        T: Scalar,
    {
        self.insert(&SVector::from_fn(|i, _| point[i].as_()))
    }

    /// Add an observation from an iterator of components
    ///
    /// At most `D + 1` components are consumed. A short iterator reports the
    /// exact count it produced; a long one reports `D + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] unless exactly `D` components
    /// are produced; the tracker is left unchanged.
    pub fn add_iter<I>(&mut self, components: I) -> Result<f64, TrackerError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut point = SVector::<f64, D>::zeros();
        let mut found = 0;

        for value in components.into_iter().take(D + 1) {
            if found < D {
                point[found] = value.as_();
            }
            found += 1;
        }

        if found != D {
            return Err(self.reject(found));
        }

        Ok(self.insert(&point))
    }
}
