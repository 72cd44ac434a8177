//! Dual-Sensor Range Fusion
//!
//! ## Overview
//!
//! Two ultrasonic sensors look at the same target. Each one alone is noisy,
//! drops out, and occasionally reports a spurious echo. This module fuses
//! both into one distance estimate plus an uncertainty the safety gate can
//! reason about.
//!
//! ```text
//! z1 ──┐                      ┌─► distance
//!      ├─► noise model ─► estimator
//! z2 ──┘       ▲              └─► uncertainty
//!              └── agreement of z1, z2
//! ```
//!
//! ## Estimators
//!
//! ### Histogram filter
//!
//! A probability mass function over equally spaced distance bins. Each
//! cycle multiplies every bin by the Gaussian likelihood of both readings
//! and renormalizes. Robust to multi-modal situations at the cost of
//! O(bins) work per cycle:
//! ```text
//! belief[i] ← belief[i] · N(z1; xᵢ, σ1) · N(z2; xᵢ, σ2)
//! estimate  = Σ xᵢ·belief[i]
//! ```
//!
//! ### Kalman filter
//!
//! Constant-position scalar Kalman filter with sequential per-sensor
//! corrections:
//! ```text
//! p ← p + q
//! k ← p / (p + r)      (per sensor that reported)
//! x ← x + k·(z - x)
//! p ← (1 - k)·p
//! ```
//!
//! ### Quantized Kalman filter
//!
//! The same recursion in `u16` values scaled by 100, for parts where
//! software floating point costs too much flash and time.
//!
//! ## Adaptive noise
//!
//! All three share [`NoiseModel`]: when the sensors disagree by more than a
//! threshold their noise grows, otherwise it shrinks, within fixed bounds.
//!
//! ## Usage Example
//!
//! ```rust
//! use rangeguard_core::config::SystemConfig;
//! use rangeguard_core::fusion::KalmanFilter;
//! use rangeguard_core::traits::RangeEstimator;
//!
//! let config = SystemConfig::default();
//! let mut kf = KalmanFilter::new(config.limits, config.kalman)?;
//!
//! for _ in 0..50 {
//!     kf.update(Some(7.0), Some(7.1));
//! }
//! let estimate = kf.current();
//! assert!((estimate.distance - 7.05).abs() < 0.1);
//! # Ok::<(), rangeguard_core::errors::ConfigError>(())
//! ```

pub mod histogram;
pub mod kalman;
pub mod noise;
pub mod quantized;

pub use histogram::HistogramFilter;
pub use kalman::KalmanFilter;
pub use noise::NoiseModel;
pub use quantized::QuantizedKalman;

/// What an update did with the cycle's samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FusionOutcome {
    /// This many measurements (1 or 2) were incorporated
    Fused(u8),
    /// Neither sensor reported; the posterior only aged
    NoMeasurement,
    /// Histogram mass collapsed and the belief was reset to uniform
    BeliefReset,
}

/// Posterior distance estimate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Estimate {
    /// Fused distance (cm)
    pub distance: f32,
    /// Uncertainty (cm²): Kalman variance or belief variance
    pub uncertainty: f32,
    /// What the producing update did
    pub outcome: FusionOutcome,
}
