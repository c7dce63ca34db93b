//! Sliding-window covariance tracking
//!
//! This module provides estimators of the mean vector and covariance matrix
//! of the most recent observations in a stream of fixed-dimension samples.
//!
//! # Algorithms
//!
//! - [`WindowedCovariance`]: lazily recomputed sample covariance over a
//!   circular window of observations
//!
//! # Example
//!
//! ```
//! use flowcov::covariance::WindowedCovariance;
//!
//! // 3-axis sensor, keep the last 15 readings
//! let mut tracker = WindowedCovariance::<f64, 3>::new(15).unwrap();
//!
//! for i in 0..20 {
//!     let x = 3.0 * i as f64;
//!     let used = tracker.add_array([x, x + 1.0, x + 2.0]);
//!     println!("Used: {:.0}%", used * 100.0);
//! }
//!
//! println!("Mean: {}", tracker.mean());
//! println!("Covariance: {}", tracker.covariance());
//! ```

mod input;
mod tracker;
mod window;

pub use tracker::{WindowedCovariance, DEFAULT_CAPACITY};
pub use window::ObservationWindow;
