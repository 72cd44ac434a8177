//! Scalar Kalman Filter for Dual-Sensor Ranging
//!
//! ## Overview
//!
//! The tracked quantity is one distance that is assumed not to move between
//! 10 ms cycles beyond a small process noise `q`. With a one-dimensional
//! state every matrix in the general filter collapses to a scalar.
//!
//! ## Recursion
//!
//! ### 1. Prediction
//! ```text
//! x̂ₖ|ₖ₋₁ = xₖ₋₁          (constant position)
//! pₖ|ₖ₋₁ = pₖ₋₁ + q
//! ```
//!
//! ### 2. Sequential correction
//! For sensor 1, then sensor 2, each only if it reported:
//! ```text
//! k = p / (p + rᵢ)
//! x = x + k·(zᵢ - x)
//! p = (1 - k)·p
//! ```
//!
//! ### 3. Post-processing
//! - measurement noise `r1`, `r2` adapts from sensor agreement (used from
//!   the next cycle on)
//! - `x` is clamped to the distance window
//!
//! ## Sequential vs. joint correction
//!
//! Folding in sensor 1 and then sensor 2 is not numerically identical to a
//! joint two-measurement update: the second reading is weighed against a
//! posterior that already contains the first, so the result leans slightly
//! toward sensor 2. The ordering is intentional and preserved.
//!
//! ## Degradation
//!
//! With no reading the cycle is prediction only: `x` stays, `p` grows by
//! `q`, and the uncertainty eventually closes the safety gate on its own.

use crate::{
    config::{KalmanConfig, RangeLimits},
    errors::ConfigResult,
    fusion::{Estimate, FusionOutcome, NoiseModel},
    traits::RangeEstimator,
};

/// Floor for the variance so it stays strictly positive
const MIN_VARIANCE: f32 = 1e-6;

/// Scalar Kalman filter over the distance window
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    /// Current estimate (cm)
    x: f32,
    /// Estimation variance (cm²)
    p: f32,
    /// Adaptive measurement noise r1, r2
    noise: NoiseModel,
    config: KalmanConfig,
    limits: RangeLimits,
    /// Outcome of the last update
    last_outcome: FusionOutcome,
}

impl KalmanFilter {
    /// Create a filter at the configured prior
    ///
    /// Fails when the prior, `q` or the noise model is unusable.
    pub fn new(limits: RangeLimits, config: KalmanConfig) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            x: limits.clamp(config.initial_estimate),
            p: config.initial_variance.max(MIN_VARIANCE),
            noise: NoiseModel::new(config.noise),
            config,
            limits,
            last_outcome: FusionOutcome::NoMeasurement,
        })
    }

    /// Prediction: the variance grows by `q`
    fn predict(&mut self) {
        self.p += self.config.process_noise;
    }

    /// Fold in one measurement with noise `r`
    fn correct(&mut self, z: f32, r: f32) {
        let k = self.p / (self.p + r);
        self.x += k * (z - self.x);
        self.p = ((1.0 - k) * self.p).max(MIN_VARIANCE);
    }

    /// Current estimate (cm)
    pub fn estimate(&self) -> f32 {
        self.x
    }

    /// Current variance (cm²)
    pub fn variance(&self) -> f32 {
        self.p
    }
}

impl RangeEstimator for KalmanFilter {
    fn update(&mut self, z1: Option<f32>, z2: Option<f32>) -> Estimate {
        let z1 = z1.filter(|z| z.is_finite());
        let z2 = z2.filter(|z| z.is_finite());

        self.predict();

        let mut fused = 0u8;
        if let Some(z) = z1 {
            self.correct(z, self.noise.get(0));
            fused += 1;
        }
        if let Some(z) = z2 {
            self.correct(z, self.noise.get(1));
            fused += 1;
        }

        self.noise.adapt(z1, z2);
        self.x = self.limits.clamp(self.x);

        self.last_outcome = if fused == 0 {
            FusionOutcome::NoMeasurement
        } else {
            FusionOutcome::Fused(fused)
        };

        self.current()
    }

    fn current(&self) -> Estimate {
        Estimate {
            distance: self.x,
            uncertainty: self.p,
            outcome: self.last_outcome,
        }
    }

    fn noise(&self) -> [f32; 2] {
        self.noise.values()
    }

    fn reset(&mut self) {
        self.x = self.limits.clamp(self.config.initial_estimate);
        self.p = self.config.initial_variance.max(MIN_VARIANCE);
        self.noise.reset();
        self.last_outcome = FusionOutcome::NoMeasurement;
    }

    fn name(&self) -> &'static str {
        "kalman"
    }
}
