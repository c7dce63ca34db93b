//! Fixed-capacity circular buffer of observations
//!
//! Slots are rows of a `capacity × D` matrix. The write cursor advances
//! modulo the capacity, so once the window is full every insertion replaces
//! the oldest observation.

use log::trace;
use nalgebra::{Const, Dyn, OMatrix, SVector};

use crate::traits::TrackerError;

/// Row-per-observation storage backing a windowed estimator
///
/// Slots that have never been written are zero and are never exposed:
/// only the first [`len`](Self::len) rows hold observations.
#[derive(Clone, Debug)]
pub struct ObservationWindow<const D: usize> {
    /// One observation per row
    slots: OMatrix<f64, Dyn, Const<D>>,
    /// Slot holding the most recent observation (`None` until the first push)
    cursor: Option<usize>,
    /// Number of populated slots
    filled: usize,
}

impl<const D: usize> ObservationWindow<D> {
    /// Create an empty window holding up to `capacity` observations
    ///
    /// Fails with [`TrackerError::InvalidConfiguration`] when either the
    /// capacity or the dimension is zero.
    pub fn new(capacity: usize) -> Result<Self, TrackerError> {
        if capacity == 0 || D == 0 {
            return Err(TrackerError::InvalidConfiguration {
                capacity,
                dimension: D,
            });
        }

        Ok(Self {
            slots: OMatrix::zeros_generic(Dyn(capacity), Const::<D>),
            cursor: None,
            filled: 0,
        })
    }

    /// Maximum number of observations retained
    pub fn capacity(&self) -> usize {
        self.slots.nrows()
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.capacity()
    }

    /// Index of the slot written by the most recent push
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Store an observation in the next slot, overwriting the oldest one
    /// once the window is full
    pub fn push(&mut self, point: &SVector<f64, D>) {
        let capacity = self.capacity();
        let slot = match self.cursor {
            Some(current) if current + 1 < capacity => current + 1,
            Some(_) => {
                trace!("window cursor wrapped after {} slots", capacity);
                0
            }
            None => 0,
        };

        self.slots.set_row(slot, &point.transpose());
        self.cursor = Some(slot);

        if self.filled < capacity {
            self.filled += 1;
            if self.filled == capacity {
                trace!("window filled: {} observations", capacity);
            }
        }
    }

    /// The backing matrix; only the first `len()` rows are meaningful
    pub fn slots(&self) -> &OMatrix<f64, Dyn, Const<D>> {
        &self.slots
    }

    /// The most recently pushed observation
    pub fn latest(&self) -> Option<SVector<f64, D>> {
        self.cursor.map(|slot| self.slots.row(slot).transpose())
    }

    /// Iterate over the retained observations, oldest first
    pub fn observations(&self) -> impl Iterator<Item = SVector<f64, D>> + '_ {
        let capacity = self.capacity();
        // Before the window fills, slots are written in order starting at 0.
        let oldest = match self.cursor {
            Some(cursor) if self.is_full() => (cursor + 1) % capacity,
            _ => 0,
        };

        (0..self.filled).map(move |offset| self.slots.row((oldest + offset) % capacity).transpose())
    }
}
