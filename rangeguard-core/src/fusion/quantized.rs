//! Integer-only Kalman filter
//!
//! Same recursion as [`KalmanFilter`](super::KalmanFilter), computed on
//! `u16` values scaled by [`QUANTIZED_SCALE`] (100). One quantum is 0.01 cm
//! for the estimate and 0.01 cm² for variances. Intermediates are `u32`
//! (variances) and `i32` (innovations), so nothing overflows for any
//! representable input.
//!
//! ```text
//! p  ← p + q                              (saturating)
//! k% ← 100·p / (p + r)
//! x  ← x + round(k%·(z - x) / 100)
//! p  ← max(p·(100 - k%) / 100, 1)
//! ```
//!
//! Noise adaptation uses integer percentages: growth rounds up and shrink
//! rounds down, so `r` keeps moving at small values instead of stalling on
//! truncation.

use crate::{
    config::{DropoutPolicy, KalmanConfig, RangeLimits},
    constants::fusion::QUANTIZED_SCALE,
    errors::{ConfigError, ConfigResult},
    fusion::{Estimate, FusionOutcome},
    traits::RangeEstimator,
};

/// Scale as the signed intermediate type
const SCALE: i32 = QUANTIZED_SCALE as i32;

/// Convert a real value into quanta, failing outside `0..=u16::MAX`
fn quantize(name: &'static str, value: f32) -> ConfigResult<u16> {
    let scaled = libm::roundf(value * QUANTIZED_SCALE as f32);
    if scaled.is_finite() && scaled >= 0.0 && scaled <= u16::MAX as f32 {
        Ok(scaled as u16)
    } else {
        Err(ConfigError::QuantizationOverflow { name, value })
    }
}

/// Like [`quantize`] but the result must be at least one quantum
fn quantize_positive(name: &'static str, value: f32) -> ConfigResult<u16> {
    match quantize(name, value)? {
        0 => Err(ConfigError::QuantizationOverflow { name, value }),
        q => Ok(q),
    }
}

/// Factor as an integer percentage
fn percent(name: &'static str, factor: f32) -> ConfigResult<u32> {
    quantize(name, factor).map(u32::from)
}

/// Signed division rounding half away from zero
#[inline]
fn div_round(num: i32, den: i32) -> i32 {
    if num >= 0 {
        (num + den / 2) / den
    } else {
        (num - den / 2) / den
    }
}

#[inline]
fn to_real(value: u16) -> f32 {
    value as f32 / QUANTIZED_SCALE as f32
}

/// Fixed-point parameters derived once from a [`KalmanConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QuantizedParams {
    initial_x: u16,
    initial_p: u16,
    q: u16,
    r_initial: u16,
    r_min: u16,
    r_max: u16,
    growth_pct: u32,
    shrink_pct: u32,
    threshold: i32,
    dropout: DropoutPolicy,
    min_x: u16,
    max_x: u16,
}

/// Scalar Kalman filter in scaled `u16` arithmetic
#[derive(Debug, Clone)]
pub struct QuantizedKalman {
    x: u16,
    p: u16,
    r: [u16; 2],
    params: QuantizedParams,
    last_outcome: FusionOutcome,
}

impl QuantizedKalman {
    /// Quantize a Kalman configuration
    ///
    /// Fails with [`ConfigError::QuantizationOverflow`] when a value does
    /// not fit a `u16` at the fixed scale, or when a strictly positive
    /// parameter rounds to zero.
    pub fn new(limits: RangeLimits, config: KalmanConfig) -> ConfigResult<Self> {
        config.validate()?;

        let noise = config.noise;
        let params = QuantizedParams {
            initial_x: quantize("initial_estimate", limits.clamp(config.initial_estimate))?,
            initial_p: quantize_positive("initial_variance", config.initial_variance)?,
            q: quantize_positive("process_noise", config.process_noise)?,
            r_initial: quantize_positive("noise.initial", noise.initial)?,
            r_min: quantize_positive("noise.min", noise.min)?,
            r_max: quantize_positive("noise.max", noise.max)?,
            growth_pct: percent("noise.growth", noise.growth)?,
            shrink_pct: percent("noise.shrink", noise.shrink)?,
            threshold: i32::from(quantize("noise.threshold", noise.disagreement_threshold)?),
            dropout: noise.dropout,
            min_x: quantize("min_dist", limits.min_dist)?,
            max_x: quantize("max_dist", limits.max_dist)?,
        };

        Ok(Self {
            x: params.initial_x,
            p: params.initial_p,
            r: [params.r_initial; 2],
            params,
            last_outcome: FusionOutcome::NoMeasurement,
        })
    }

    /// Raw `(x, p)` in quanta
    pub fn raw_state(&self) -> (u16, u16) {
        (self.x, self.p)
    }

    /// Raw `r1`, `r2` in quanta
    pub fn raw_noise(&self) -> [u16; 2] {
        self.r
    }

    /// Quantize one reading; non-finite readings are dropped
    fn sample(z: Option<f32>) -> Option<i32> {
        let z = z?;
        if !z.is_finite() {
            return None;
        }
        // readings are bounded by the window plus one; saturate regardless
        let scaled = libm::roundf(z * QUANTIZED_SCALE as f32);
        Some(scaled.max(0.0).min(u16::MAX as f32) as i32)
    }

    fn correct(&mut self, z: i32, r: u16) {
        let p = u32::from(self.p);
        let k = p * QUANTIZED_SCALE / (p + u32::from(r));

        let innovation = z - i32::from(self.x);
        let x = i32::from(self.x) + div_round(k as i32 * innovation, SCALE);
        self.x = x.max(0).min(i32::from(u16::MAX)) as u16;

        let p = p * (QUANTIZED_SCALE - k) / QUANTIZED_SCALE;
        self.p = p.max(1) as u16;
    }

    fn adapt(&mut self, z1: Option<i32>, z2: Option<i32>) {
        let grow = match (z1, z2) {
            (Some(a), Some(b)) => (a - b).abs() > self.params.threshold,
            _ if self.params.dropout == DropoutPolicy::Hold => return,
            _ => false,
        };

        let (min, max) = (u32::from(self.params.r_min), u32::from(self.params.r_max));
        for r in self.r.iter_mut() {
            let value = u32::from(*r);
            let next = if grow {
                (value * self.params.growth_pct).div_ceil(QUANTIZED_SCALE)
            } else {
                value * self.params.shrink_pct / QUANTIZED_SCALE
            };
            *r = next.max(min).min(max) as u16;
        }
    }
}

impl RangeEstimator for QuantizedKalman {
    fn update(&mut self, z1: Option<f32>, z2: Option<f32>) -> Estimate {
        let (z1, z2) = (Self::sample(z1), Self::sample(z2));

        self.p = self.p.saturating_add(self.params.q);

        let mut fused = 0u8;
        if let Some(z) = z1 {
            self.correct(z, self.r[0]);
            fused += 1;
        }
        if let Some(z) = z2 {
            self.correct(z, self.r[1]);
            fused += 1;
        }

        self.adapt(z1, z2);
        self.x = self.x.max(self.params.min_x).min(self.params.max_x);

        self.last_outcome = if fused == 0 {
            FusionOutcome::NoMeasurement
        } else {
            FusionOutcome::Fused(fused)
        };

        self.current()
    }

    fn current(&self) -> Estimate {
        Estimate {
            distance: to_real(self.x),
            uncertainty: to_real(self.p),
            outcome: self.last_outcome,
        }
    }

    fn noise(&self) -> [f32; 2] {
        [to_real(self.r[0]), to_real(self.r[1])]
    }

    fn reset(&mut self) {
        self.x = self.params.initial_x;
        self.p = self.params.initial_p;
        self.r = [self.params.r_initial; 2];
        self.last_outcome = FusionOutcome::NoMeasurement;
    }

    fn name(&self) -> &'static str {
        "quantized-kalman"
    }
}
