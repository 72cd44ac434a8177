//! Range Estimator Trait
//!
//! Three estimators implement the same contract:
//!
//! - [`HistogramFilter`](crate::fusion::HistogramFilter): discretized
//!   Bayesian filter over the distance window
//! - [`KalmanFilter`](crate::fusion::KalmanFilter): scalar floating-point
//!   Kalman filter
//! - [`QuantizedKalman`](crate::fusion::QuantizedKalman): the same filter
//!   in scaled `u16` arithmetic for targets without an FPU
//!
//! The safety gate and actuator only see the [`Estimate`] an update
//! returns, so strategies can be swapped without touching them.
//!
//! ## Implementation Guidelines
//!
//! 1. **Never panic**: any input, including NaN, must produce an estimate
//! 2. **Bounded time**: O(bins) at most, no allocation
//! 3. **Degrade, don't fail**: a cycle without measurements still returns
//!    the current estimate, with uncertainty that reflects it
//!
//! ## Example Implementation
//!
//! ```rust
//! use rangeguard_core::traits::RangeEstimator;
//! use rangeguard_core::fusion::{Estimate, FusionOutcome};
//!
//! /// Averages whatever arrives, with fixed confidence
//! struct Average { last: f32 }
//!
//! impl RangeEstimator for Average {
//!     fn update(&mut self, z1: Option<f32>, z2: Option<f32>) -> Estimate {
//!         let outcome = match (z1, z2) {
//!             (Some(a), Some(b)) => { self.last = (a + b) / 2.0; FusionOutcome::Fused(2) }
//!             (Some(a), None) | (None, Some(a)) => { self.last = a; FusionOutcome::Fused(1) }
//!             (None, None) => FusionOutcome::NoMeasurement,
//!         };
//!         Estimate { distance: self.last, uncertainty: 0.1, outcome }
//!     }
//!
//!     fn current(&self) -> Estimate {
//!         Estimate { distance: self.last, uncertainty: 0.1, outcome: FusionOutcome::NoMeasurement }
//!     }
//!
//!     fn noise(&self) -> [f32; 2] { [0.0, 0.0] }
//!     fn reset(&mut self) { self.last = 10.0; }
//!     fn name(&self) -> &'static str { "average" }
//! }
//! ```

use crate::fusion::Estimate;

/// Common contract of the interchangeable estimators
///
/// `z1`/`z2` are the distances carried by this cycle's samples, `None`
/// when the sensor produced no echo. Out-of-range (diffuse) readings are
/// passed through as values above the window so they pull the estimate
/// out of the safe band.
pub trait RangeEstimator {
    /// Fuse one cycle of samples and return the posterior
    fn update(&mut self, z1: Option<f32>, z2: Option<f32>) -> Estimate;

    /// Current posterior without consuming a cycle
    fn current(&self) -> Estimate;

    /// Current per-sensor noise parameters (sigma or r, in float units)
    fn noise(&self) -> [f32; 2];

    /// Return to the configured prior
    fn reset(&mut self);

    /// Short name for diagnostics
    fn name(&self) -> &'static str;
}
