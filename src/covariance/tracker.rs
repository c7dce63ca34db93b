//! Sliding-window mean and covariance
//!
//! Derived statistics are recomputed lazily: an insertion only marks them
//! stale, and the next query rebuilds what it needs with the two-pass
//! (mean, then residuals) formula.

use core::fmt::Debug;
use core::marker::PhantomData;

use log::{debug, warn};
use nalgebra::{Const, Dyn, OMatrix, SMatrix, SVector};
use num_traits::AsPrimitive;

use super::window::ObservationWindow;
use crate::traits::{CovarianceEstimator, TrackerError, WindowedEstimator};

/// Window capacity used by [`WindowedCovariance::with_default_capacity`]
pub const DEFAULT_CAPACITY: usize = 100;

/// Mean and covariance over the most recent `capacity` observations
///
/// `T` is the input scalar type; components are converted to `f64` on
/// insertion. `D` is the number of components per observation.
///
/// The covariance is the sample estimator with Bessel's correction,
/// `Rᵀ·R / (n − 1)` where `R` holds the mean-centered observations. It is
/// returned as an `nalgebra` matrix (column-major storage); since it is
/// symmetric, row-major and column-major reads agree.
///
/// # Example
///
/// ```
/// use flowcov::covariance::WindowedCovariance;
///
/// let mut tracker = WindowedCovariance::<f64, 1>::new(2).unwrap();
///
/// for value in [1.0, 2.0, 3.0] {
///     tracker.add_observation(&[value]).unwrap();
/// }
///
/// // Only {2.0, 3.0} remain in the window
/// assert_eq!(tracker.usage_fraction(), 1.0);
/// assert!((tracker.mean()[0] - 2.5).abs() < 1e-12);
/// assert!((tracker.covariance()[(0, 0)] - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct WindowedCovariance<T, const D: usize> {
    window: ObservationWindow<D>,
    /// Cached column-wise mean
    mean: SVector<f64, D>,
    /// Mean-centered copy of the window; first `window.len()` rows are valid
    residuals: OMatrix<f64, Dyn, Const<D>>,
    /// Cached sample covariance
    covariance: SMatrix<f64, D, D>,
    mean_stale: bool,
    residuals_stale: bool,
    covariance_stale: bool,
    _input: PhantomData<fn(T)>,
}

impl<T, const D: usize> WindowedCovariance<T, D>
where
    T: AsPrimitive<f64>,
{
    /// Create a tracker retaining the most recent `capacity` observations
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfiguration`] if `capacity` or `D`
    /// is zero.
    pub fn new(capacity: usize) -> Result<Self, TrackerError> {
        let window = ObservationWindow::new(capacity)?;
        debug!(
            "created windowed covariance tracker: dimension {}, capacity {}",
            D, capacity
        );

        Ok(Self {
            window,
            mean: SVector::zeros(),
            residuals: OMatrix::zeros_generic(Dyn(capacity), Const::<D>),
            covariance: SMatrix::zeros(),
            mean_stale: true,
            residuals_stale: true,
            covariance_stale: true,
            _input: PhantomData,
        })
    }

    /// Create a tracker with [`DEFAULT_CAPACITY`]
    pub fn with_default_capacity() -> Result<Self, TrackerError> {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Add an observation of exactly `D` components
    ///
    /// Returns the fraction of the window in use after the insertion.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] if `point.len() != D`; the
    /// tracker is left unchanged.
    pub fn add_observation(&mut self, point: &[T]) -> Result<f64, TrackerError> {
        if point.len() != D {
            return Err(self.reject(point.len()));
        }

        Ok(self.insert(&SVector::from_fn(|i, _| point[i].as_())))
    }

    /// Single insertion path shared by every input adapter
    pub(crate) fn insert(&mut self, point: &SVector<f64, D>) -> f64 {
        self.window.push(point);

        self.mean_stale = true;
        self.residuals_stale = true;
        self.covariance_stale = true;

        self.usage_fraction()
    }

    pub(crate) fn reject(&self, found: usize) -> TrackerError {
        warn!(
            "rejected observation with {} components, tracker dimension is {}",
            found, D
        );
        TrackerError::InvalidInput { expected: D, found }
    }

    /// Column-wise mean of the observations in the window
    ///
    /// Returns the zero vector while the window is empty.
    pub fn mean(&mut self) -> SVector<f64, D> {
        if self.mean_stale {
            let n = self.window.len();
            self.mean = if n == 0 {
                SVector::zeros()
            } else {
                self.window.slots().rows(0, n).row_sum().transpose() / n as f64
            };
            self.mean_stale = false;
        }

        self.mean
    }

    fn refresh_residuals(&mut self) {
        if !self.residuals_stale {
            return;
        }

        let mean = self.mean().transpose();
        let slots = self.window.slots();
        for row in 0..self.window.len() {
            let centered = &slots.row(row) - &mean;
            self.residuals.set_row(row, &centered);
        }

        self.residuals_stale = false;
    }

    /// Sample covariance matrix of the observations in the window
    ///
    /// Returns the zero matrix while fewer than two observations are held.
    pub fn covariance(&mut self) -> SMatrix<f64, D, D> {
        let n = self.window.len();
        if n <= 1 {
            return SMatrix::zeros();
        }

        if self.covariance_stale {
            self.refresh_residuals();
            let centered = self.residuals.rows(0, n);
            self.covariance = centered.tr_mul(&centered) / (n - 1) as f64;
            self.covariance_stale = false;
        }

        self.covariance
    }

    /// Per-component sample variances (the covariance diagonal)
    pub fn variances(&mut self) -> SVector<f64, D> {
        let covariance = self.covariance();
        SVector::from_fn(|i, _| covariance[(i, i)])
    }

    /// Fraction of the window populated with observations
    pub fn usage_fraction(&self) -> f64 {
        self.window.len() as f64 / self.window.capacity() as f64
    }

    /// Maximum number of observations retained
    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Number of components per observation
    pub fn dimension(&self) -> usize {
        D
    }

    /// Number of observations currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    /// The most recently added observation
    pub fn latest(&self) -> Option<SVector<f64, D>> {
        self.window.latest()
    }

    /// Iterate over the observations in the window, oldest first
    pub fn observations(&self) -> impl Iterator<Item = SVector<f64, D>> + '_ {
        self.window.observations()
    }

    /// Build a tracker with a different capacity from this one's window
    ///
    /// The new tracker holds the most recent `min(len, capacity)`
    /// observations in their original order; older ones are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfiguration`] if `capacity` is zero.
    pub fn resized(&self, capacity: usize) -> Result<Self, TrackerError> {
        let mut resized = Self::new(capacity)?;

        let dropped = self.window.len().saturating_sub(capacity);
        for point in self.window.observations().skip(dropped) {
            resized.insert(&point);
        }

        debug!(
            "resized window from {} to {} slots, dropped {} oldest observations",
            self.capacity(),
            capacity,
            dropped
        );
        Ok(resized)
    }
}

impl<T, const D: usize> WindowedEstimator for WindowedCovariance<T, D>
where
    T: AsPrimitive<f64> + Debug,
{
    type Item = [T];

    fn update(&mut self, item: &Self::Item) -> Result<f64, TrackerError> {
        self.add_observation(item)
    }

    fn capacity(&self) -> usize {
        self.window.capacity()
    }

    fn len(&self) -> usize {
        self.window.len()
    }

    fn size_bytes(&self) -> usize {
        // window slots + residuals
        core::mem::size_of::<Self>() + 2 * self.window.capacity() * D * core::mem::size_of::<f64>()
    }
}

impl<T, const D: usize> CovarianceEstimator for WindowedCovariance<T, D>
where
    T: AsPrimitive<f64> + Debug,
{
    type Mean = SVector<f64, D>;
    type Covariance = SMatrix<f64, D, D>;

    fn dimension(&self) -> usize {
        D
    }

    fn mean(&mut self) -> Self::Mean {
        WindowedCovariance::mean(self)
    }

    fn covariance(&mut self) -> Self::Covariance {
        WindowedCovariance::covariance(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_zero_capacity() {
        let err = WindowedCovariance::<f64, 3>::new(0).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidConfiguration { capacity: 0, .. }
        ));
    }

    #[test]
    fn test_default_capacity() {
        let tracker = WindowedCovariance::<f32, 2>::with_default_capacity().unwrap();

        assert_eq!(tracker.capacity(), DEFAULT_CAPACITY);
        assert_eq!(tracker.dimension(), 2);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_empty() {
        let mut tracker = WindowedCovariance::<f64, 3>::new(10).unwrap();

        assert_eq!(tracker.usage_fraction(), 0.0);
        assert_eq!(tracker.mean(), SVector::<f64, 3>::zeros());
        assert_eq!(tracker.covariance(), SMatrix::<f64, 3, 3>::zeros());
        assert_eq!(tracker.latest(), None);
    }

    #[test]
    fn test_single_observation() {
        let mut tracker = WindowedCovariance::<f64, 2>::new(4).unwrap();

        let used = tracker.add_observation(&[3.0, -1.0]).unwrap();

        assert_eq!(used, 0.25);
        assert_eq!(tracker.mean(), SVector::from([3.0, -1.0]));
        assert_eq!(tracker.covariance(), SMatrix::<f64, 2, 2>::zeros());
    }

    #[test]
    fn test_known_variance() {
        let mut tracker = WindowedCovariance::<f64, 1>::new(3).unwrap();

        for v in [1.0, 2.0, 3.0] {
            tracker.add_observation(&[v]).unwrap();
        }

        assert!((tracker.mean()[0] - 2.0).abs() < EPS);
        assert!((tracker.covariance()[(0, 0)] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut tracker = WindowedCovariance::<f64, 1>::new(2).unwrap();

        for v in [1.0, 2.0, 3.0] {
            tracker.add_observation(&[v]).unwrap();
        }

        let window: Vec<f64> = tracker.observations().map(|p| p[0]).collect();
        assert_eq!(window, [2.0, 3.0]);
        assert!((tracker.mean()[0] - 2.5).abs() < EPS);
        assert!((tracker.covariance()[(0, 0)] - 0.5).abs() < EPS);
    }

    #[test]
    fn test_two_dimensional_covariance() {
        // y = 2x, so cov(x, y) = 2 var(x) and var(y) = 4 var(x)
        let mut tracker = WindowedCovariance::<i32, 2>::new(8).unwrap();

        for x in [1, 2, 3, 4] {
            tracker.add_observation(&[x, 2 * x]).unwrap();
        }

        let mean = tracker.mean();
        assert!((mean[0] - 2.5).abs() < EPS);
        assert!((mean[1] - 5.0).abs() < EPS);

        // var(1, 2, 3, 4) with Bessel's correction = 5/3
        let var_x = 5.0 / 3.0;
        let cov = tracker.covariance();
        assert!((cov[(0, 0)] - var_x).abs() < EPS);
        assert!((cov[(0, 1)] - 2.0 * var_x).abs() < EPS);
        assert!((cov[(1, 0)] - 2.0 * var_x).abs() < EPS);
        assert!((cov[(1, 1)] - 4.0 * var_x).abs() < EPS);

        let variances = tracker.variances();
        assert!((variances[1] - 4.0 * var_x).abs() < EPS);
    }

    #[test]
    fn test_shape_mismatch_leaves_state() {
        let mut tracker = WindowedCovariance::<f64, 3>::new(5).unwrap();
        tracker.add_observation(&[1.0, 2.0, 3.0]).unwrap();
        let mean_before = tracker.mean();

        let err = tracker.add_observation(&[1.0, 2.0]).unwrap_err();

        assert_eq!(
            err,
            TrackerError::InvalidInput {
                expected: 3,
                found: 2
            }
        );
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.usage_fraction(), 0.2);
        assert_eq!(tracker.mean(), mean_before);
        assert_eq!(tracker.latest(), Some(SVector::from([1.0, 2.0, 3.0])));
    }

    #[test]
    fn test_stale_flags() {
        let mut tracker = WindowedCovariance::<f64, 2>::new(4).unwrap();
        tracker.add_observation(&[1.0, 1.0]).unwrap();
        tracker.add_observation(&[3.0, 5.0]).unwrap();

        assert!(tracker.mean_stale && tracker.residuals_stale && tracker.covariance_stale);

        tracker.mean();
        assert!(!tracker.mean_stale);
        assert!(tracker.residuals_stale && tracker.covariance_stale);

        tracker.covariance();
        assert!(!tracker.residuals_stale && !tracker.covariance_stale);

        tracker.add_observation(&[0.0, 0.0]).unwrap();
        assert!(tracker.mean_stale && tracker.residuals_stale && tracker.covariance_stale);
    }

    #[test]
    fn test_cached_results_repeat() {
        let mut tracker = WindowedCovariance::<f64, 3>::new(6).unwrap();
        for i in 0..9 {
            let x = i as f64;
            tracker.add_observation(&[(x * 1.7) % 3.0, x * 0.3, (x * x) % 5.0]).unwrap();
        }

        let mean = tracker.mean();
        let cov = tracker.covariance();
        for _ in 0..5 {
            assert_eq!(tracker.mean(), mean);
            assert_eq!(tracker.covariance(), cov);
        }
    }

    #[test]
    fn test_input_conversion() {
        let mut from_f32 = WindowedCovariance::<f32, 2>::new(3).unwrap();
        let mut from_u8 = WindowedCovariance::<u8, 2>::new(3).unwrap();

        for (a, b) in [(1u8, 4u8), (2, 8), (6, 1)] {
            from_f32.add_observation(&[a as f32, b as f32]).unwrap();
            from_u8.add_observation(&[a, b]).unwrap();
        }

        assert_eq!(from_f32.mean(), from_u8.mean());
        assert_eq!(from_f32.covariance(), from_u8.covariance());
    }

    #[test]
    fn test_resized_keeps_newest() {
        let mut tracker = WindowedCovariance::<f64, 1>::new(5).unwrap();
        for v in 1..=7 {
            tracker.add_observation(&[v as f64]).unwrap();
        }

        let mut smaller = tracker.resized(2).unwrap();
        let kept: Vec<f64> = smaller.observations().map(|p| p[0]).collect();
        assert_eq!(kept, [6.0, 7.0]);
        assert_eq!(smaller.usage_fraction(), 1.0);
        assert!((smaller.mean()[0] - 6.5).abs() < EPS);

        let mut larger = tracker.resized(10).unwrap();
        let kept: Vec<f64> = larger.observations().map(|p| p[0]).collect();
        assert_eq!(kept, [3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(larger.usage_fraction(), 0.5);
        assert!((larger.mean()[0] - tracker.mean()[0]).abs() < EPS);

        // source tracker is untouched
        assert_eq!(tracker.capacity(), 5);
        assert_eq!(tracker.len(), 5);
    }

    #[test]
    fn test_resized_zero_capacity() {
        let tracker = WindowedCovariance::<f64, 1>::new(5).unwrap();
        assert!(tracker.resized(0).is_err());
    }

    #[test]
    fn test_trait_surface() {
        fn drive<E: CovarianceEstimator<Item = [f64]>>(estimator: &mut E) -> E::Covariance {
            estimator.update(&[1.0, 0.0]).unwrap();
            estimator.update(&[0.0, 1.0]).unwrap();
            assert!(estimator.update(&[1.0]).is_err());
            assert_eq!(estimator.len(), 2);
            assert!(estimator.is_full());
            estimator.covariance()
        }

        let mut tracker = WindowedCovariance::<f64, 2>::new(2).unwrap();
        let cov = drive(&mut tracker);

        assert!((cov[(0, 0)] - 0.5).abs() < EPS);
        assert!((cov[(0, 1)] + 0.5).abs() < EPS);
        assert!(tracker.size_bytes() > 2 * 2 * 2 * core::mem::size_of::<f64>());
    }
}
