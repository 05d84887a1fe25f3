// =============================================================================
// RollingMean — fixed-size sliding-window mean accumulator
// =============================================================================
//
// A ring buffer of the last `capacity` samples plus a running sum, so the
// mean of the trailing window is available in O(1) per push instead of
// re-deriving it from the whole history on every evaluation.
// =============================================================================

use std::collections::VecDeque;

/// Arithmetic mean over a trailing window of fixed length.
///
/// `push` returns `Some(mean)` only once the window is full; partial windows
/// yield `None` so callers cannot mistake warm-up output for a real value.
#[derive(Debug, Clone)]
pub struct RollingMean {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingMean {
    /// Create an accumulator over a window of `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    /// Feed one sample; returns the window mean once `capacity` samples are
    /// present, evicting the oldest sample first.
    ///
    /// A zero-capacity window can never fill and always returns `None`.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.capacity == 0 {
            return None;
        }

        if self.samples.len() == self.capacity {
            if let Some(evicted) = self.samples.pop_front() {
                self.sum -= evicted;
            }
        }

        self.samples.push_back(value);
        self.sum += value;

        if self.samples.len() == self.capacity {
            Some(self.sum / self.capacity as f64)
        } else {
            None
        }
    }

}
