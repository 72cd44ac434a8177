//! Stability Tracker
//!
//! ## Overview
//!
//! The safety gate needs to know not only where the target is now but
//! whether it has been holding still. [`EstimateHistory`] keeps the last `N`
//! fused estimates in a fixed array and answers two questions about them:
//!
//! - **variation**: `max - min` over the recorded estimates
//! - **all at most**: whether every recorded estimate is at or below a limit
//!
//! ## Design
//!
//! A ring buffer gives constant-time insertion with no allocation, and
//! overwriting the oldest entry is exactly the sliding-window semantics the
//! gate wants. Slots are `Option<f32>` so that slots never written since
//! start (or since [`clear`](EstimateHistory::clear)) are absent rather than
//! zero: a fresh history must not look like the target sat at 0 cm.
//!
//! ```text
//! EstimateHistory<5> after 7 records (e0..e6):
//! ┌────┬────┬────┬────┬────┐
//! │ e5 │ e6 │ e2 │ e3 │ e4 │
//! └────┴────┴────┴────┴────┘
//!           ↑
//!           └── write_pos = 2 (oldest entry, next to be overwritten)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use rangeguard_core::buffer::EstimateHistory;
//!
//! let mut history: EstimateHistory<5> = EstimateHistory::new();
//! for d in [5.0, 5.1, 5.05] {
//!     history.record(d);
//! }
//!
//! assert!((history.variation() - 0.1).abs() < 1e-6);
//! assert!(history.all_at_most(18.0));
//! ```

/// Fixed-size circular history of fused estimates
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - the `len` most recent slots are `Some`
#[derive(Debug, Clone)]
pub struct EstimateHistory<const N: usize> {
    /// Slots, `None` until written
    data: [Option<f32>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Number of written slots, saturates at N
    len: usize,
}

impl<const N: usize> EstimateHistory<N> {
    /// Empty history
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Record an estimate, overwriting the oldest when full
    pub fn record(&mut self, estimate: f32) {
        if N == 0 {
            return;
        }

        self.data[self.write_pos] = Some(estimate);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Spread `max - min` over the recorded estimates
    ///
    /// Zero when empty or holding a single value. A NaN entry makes the
    /// result NaN, which the gate treats as unstable.
    pub fn variation(&self) -> f32 {
        let mut values = self.iter();
        let first = match values.next() {
            Some(v) => v,
            None => return 0.0,
        };

        let mut min = first;
        let mut max = first;
        let mut nan = first.is_nan();
        for v in values {
            nan |= v.is_nan();
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }

        if nan {
            f32::NAN
        } else {
            max - min
        }
    }

    /// Whether every recorded estimate is at or below `limit`
    ///
    /// Vacuously true when empty; false if any entry is NaN.
    pub fn all_at_most(&self, limit: f32) -> bool {
        self.iter().all(|v| v <= limit)
    }

    /// Number of recorded estimates
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if every slot has been written
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Most recent estimate
    pub fn last(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx]
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> HistoryIter<'_, N> {
        HistoryIter { history: self, index: 0 }
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Estimate by logical index (0 = oldest)
    ///
    /// ```text
    /// Physical:  [D, E, A, B, C]  (write_pos = 2, full)
    /// Logical:   [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % N]
    /// ```
    fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len {
            return None;
        }

        let actual = if self.len < N { index } else { (self.write_pos + index) % N };
        self.data[actual]
    }
}

impl<const N: usize> Default for EstimateHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over recorded estimates, oldest first
pub struct HistoryIter<'a, const N: usize> {
    history: &'a EstimateHistory<N>,
    index: usize,
}

impl<const N: usize> Iterator for HistoryIter<'_, N> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let item = self.history.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.history.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history() {
        let history: EstimateHistory<5> = EstimateHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.last().is_none());
        assert_eq!(history.variation(), 0.0);
        assert!(history.all_at_most(0.0));
    }

    #[test]
    fn single_value_has_no_variation() {
        let mut history = EstimateHistory::<5>::new();
        history.record(7.0);
        assert_eq!(history.variation(), 0.0);
        assert_eq!(history.last(), Some(7.0));
    }

    #[test]
    fn circular_overwrite() {
        let mut history = EstimateHistory::<3>::new();
        for i in 0..5 {
            history.record(i as f32);
        }

        assert_eq!(history.len(), 3);
        assert!(history.is_full());

        let values: Vec<f32> = history.iter().collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(history.last(), Some(4.0));
        assert_eq!(history.variation(), 2.0);
    }

    #[test]
    fn unwritten_slots_are_ignored() {
        let mut history = EstimateHistory::<5>::new();
        history.record(10.0);
        history.record(10.1);
        // a zero-filled buffer would report a spread of 10.1
        assert!((history.variation() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn all_at_most_checks_every_entry() {
        let mut history = EstimateHistory::<5>::new();
        for _ in 0..4 {
            history.record(5.0);
        }
        history.record(19.0);
        assert!(!history.all_at_most(18.0));

        // the 19 ages out after five more records
        for _ in 0..5 {
            history.record(5.0);
        }
        assert!(history.all_at_most(18.0));
    }

    #[test]
    fn nan_poisons_checks() {
        let mut history = EstimateHistory::<5>::new();
        history.record(5.0);
        history.record(f32::NAN);
        assert!(history.variation().is_nan());
        assert!(!history.all_at_most(18.0));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut history = EstimateHistory::<4>::new();
        for i in 0..6 {
            history.record(i as f32);
        }
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.iter().count(), 0);
        history.record(1.0);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![1.0]);
    }
}
