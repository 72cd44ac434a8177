//! Discretized Bayesian histogram filter
//!
//! The belief is a probability mass function over bin centres
//! `min_dist + i·step`. There is no motion model: the target is assumed
//! static between cycles, so each update is a pure measurement update.
//!
//! ```text
//! sigma  ← noise.adapt(z1, z2)
//! belief ← belief · N(z1; x, σ1) · N(z2; x, σ2)     (present samples only)
//! belief ← belief / Σ belief
//! ```
//!
//! When the product underflows (a reading far from a sharply peaked
//! belief) the mass collapses to zero. The filter then restarts from a
//! uniform belief and reports [`FusionOutcome::BeliefReset`] rather than
//! dividing by zero.

use core::f32::consts::PI;

use heapless::Vec;

use crate::{
    config::{HistogramConfig, RangeLimits},
    constants::fusion::MAX_HISTOGRAM_BINS,
    errors::{ConfigError, ConfigResult},
    fusion::{Estimate, FusionOutcome, NoiseModel},
    traits::RangeEstimator,
};

/// Gaussian probability density
#[inline]
fn gaussian(x: f32, mean: f32, sigma: f32) -> f32 {
    let d = (x - mean) / sigma;
    libm::expf(-0.5 * d * d) / (sigma * libm::sqrtf(2.0 * PI))
}

/// Histogram filter with adaptive per-sensor sigma
#[derive(Debug, Clone)]
pub struct HistogramFilter {
    belief: Vec<f32, MAX_HISTOGRAM_BINS>,
    noise: NoiseModel,
    limits: RangeLimits,
    step: f32,
    last: Estimate,
}

impl HistogramFilter {
    /// Build a uniform belief over `limits`
    ///
    /// Fails when the grid does not fit the fixed capacity or the noise
    /// model is inconsistent.
    pub fn new(limits: RangeLimits, config: HistogramConfig) -> ConfigResult<Self> {
        config.validate(&limits)?;

        let bins = config.bin_count(&limits);
        let mut belief = Vec::new();
        belief
            .resize(bins, 1.0 / bins as f32)
            .map_err(|_| ConfigError::TooManyBins { required: bins, capacity: MAX_HISTOGRAM_BINS })?;

        let mut filter = Self {
            belief,
            noise: NoiseModel::new(config.noise),
            limits,
            step: config.step,
            last: Estimate {
                distance: limits.midpoint(),
                uncertainty: 0.0,
                outcome: FusionOutcome::NoMeasurement,
            },
        };
        filter.last = filter.summarize(FusionOutcome::NoMeasurement);
        Ok(filter)
    }

    /// Distance at the centre of bin `index`
    #[inline]
    pub fn bin_center(&self, index: usize) -> f32 {
        self.limits.min_dist + index as f32 * self.step
    }

    /// Current probability mass per bin
    pub fn belief(&self) -> &[f32] {
        &self.belief
    }

    /// Number of bins
    pub fn bins(&self) -> usize {
        self.belief.len()
    }

    fn make_uniform(&mut self) {
        let p = 1.0 / self.belief.len() as f32;
        for b in self.belief.iter_mut() {
            *b = p;
        }
    }

    /// Multiply in the likelihood of one reading
    fn weigh(&mut self, z: f32, sigma: f32) {
        let min = self.limits.min_dist;
        let step = self.step;
        for (i, b) in self.belief.iter_mut().enumerate() {
            *b *= gaussian(min + i as f32 * step, z, sigma);
        }
    }

    /// Renormalize, `false` if the mass collapsed
    fn normalize(&mut self) -> bool {
        let total: f32 = self.belief.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return false;
        }

        for b in self.belief.iter_mut() {
            *b /= total;
        }
        true
    }

    /// Weighted mean and variance of the belief
    fn summarize(&self, outcome: FusionOutcome) -> Estimate {
        let mut weight = 0.0f32;
        let mut sum = 0.0f32;
        for (i, b) in self.belief.iter().enumerate() {
            weight += b;
            sum += b * self.bin_center(i);
        }

        if !(weight > 0.0 && weight.is_finite()) {
            return Estimate {
                distance: self.limits.midpoint(),
                uncertainty: f32::INFINITY,
                outcome,
            };
        }

        let mean = sum / weight;
        let spread: f32 = self
            .belief
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let d = self.bin_center(i) - mean;
                b * d * d
            })
            .sum();

        Estimate {
            distance: mean,
            uncertainty: spread / weight,
            outcome,
        }
    }
}

impl RangeEstimator for HistogramFilter {
    fn update(&mut self, z1: Option<f32>, z2: Option<f32>) -> Estimate {
        self.noise.adapt(z1, z2);

        let readings = [z1, z2];
        let mut fused = 0u8;
        for (k, z) in readings.iter().enumerate() {
            if let Some(z) = z {
                if z.is_finite() {
                    self.weigh(*z, self.noise.get(k));
                    fused += 1;
                }
            }
        }

        let outcome = if fused == 0 {
            FusionOutcome::NoMeasurement
        } else if self.normalize() {
            FusionOutcome::Fused(fused)
        } else {
            log_warn!("histogram belief collapsed, resetting to uniform");
            self.make_uniform();
            FusionOutcome::BeliefReset
        };

        self.last = self.summarize(outcome);
        self.last
    }

    fn current(&self) -> Estimate {
        self.last
    }

    fn noise(&self) -> [f32; 2] {
        self.noise.values()
    }

    fn reset(&mut self) {
        self.make_uniform();
        self.noise.reset();
        self.last = self.summarize(FusionOutcome::NoMeasurement);
    }

    fn name(&self) -> &'static str {
        "histogram"
    }
}
