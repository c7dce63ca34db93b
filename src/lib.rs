//! # Flowcov
//!
//! Sliding-window statistics for fixed-dimension sensor streams.
//!
//! Flowcov keeps the most recent observations of a stream in a fixed-size
//! circular window and derives the sample mean and covariance matrix from it.
//! Memory is bounded by the window capacity, and statistics are recomputed
//! only when queried after new data has arrived.
//!
//! ## Features
//!
//! - **Windowed Covariance**: Mean vector and sample covariance over the last
//!   `W` observations with [`WindowedCovariance`]
//! - **Lazy Recomputation**: Insertion is O(D); derived statistics are rebuilt
//!   on the next query only
//! - **Mixed Input Types**: Any primitive numeric input, converted to `f64`
//!
//! ## Quick Start
//!
//! ```rust
//! use flowcov::prelude::*;
//!
//! let mut tracker = WindowedCovariance::<f64, 2>::new(100).unwrap();
//! for (x, y) in [(1.0, 2.0), (2.0, 4.1), (3.0, 5.9)] {
//!     tracker.add_array([x, y]);
//! }
//!
//! let cov = tracker.covariance();
//! assert!(cov[(0, 1)] > 0.0);
//! assert_eq!(cov[(0, 1)], cov[(1, 0)]);
//! ```
//!
//! ## Feature Flags
//!
//! Algorithm families:
//! - `covariance` (default): Sliding-window mean and covariance
//! - `full`: Enable all algorithm families
//!
//! Platform features:
//! - `std` (default): Standard library support
//! - `libm`: Float math for `no_std` builds (use with `default-features = false`)
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade. Nothing is
//! emitted unless the application installs a logger.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Core traits always available
pub mod traits;

#[cfg(feature = "covariance")]
#[cfg_attr(docsrs, doc(cfg(feature = "covariance")))]
pub mod covariance;

pub mod prelude {
    pub use crate::traits::*;

    #[cfg(feature = "covariance")]
    pub use crate::covariance::WindowedCovariance;
}

#[cfg(feature = "covariance")]
pub use covariance::WindowedCovariance;

pub use traits::TrackerError;
