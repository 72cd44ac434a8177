//! Load-Time Configuration
//!
//! Every tunable of the engine lives in [`SystemConfig`]. Values are fixed
//! for the lifetime of a controller; there is no runtime mutation. Defaults
//! come from [`constants`](crate::constants) and describe the 20 cm
//! reference rig; [`SystemConfig::short_range`] describes the 15 cm rig.
//!
//! ```rust
//! use rangeguard_core::config::{SystemConfig, SensorSanity};
//!
//! let config = SystemConfig::default()
//!     .with_safety_margin(1.5)
//!     .with_sensor_sanity(SensorSanity::NoneUnsafe);
//! config.validate()?;
//! assert_eq!(config.gate.safe_max(&config.limits), 18.5);
//! # Ok::<(), rangeguard_core::errors::ConfigError>(())
//! ```
//!
//! The history length is not part of this struct: it sizes a fixed array
//! and is therefore a const generic on
//! [`Controller`](crate::controller::Controller).

use fugit::{MicrosDurationU32, MillisDurationU32};

use crate::constants::{fusion, ranging, safety, timing};
use crate::errors::{ensure_positive, ConfigError, ConfigResult};

/// Distance window every sample and estimate is clamped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeLimits {
    /// Minimum useful distance (cm)
    pub min_dist: f32,
    /// Maximum reliable distance (cm)
    pub max_dist: f32,
}

impl RangeLimits {
    /// Create a distance window
    pub const fn new(min_dist: f32, max_dist: f32) -> Self {
        Self { min_dist, max_dist }
    }

    /// Clamp a distance into the window
    pub fn clamp(&self, distance: f32) -> f32 {
        if distance < self.min_dist {
            self.min_dist
        } else if distance > self.max_dist {
            self.max_dist
        } else {
            distance
        }
    }

    /// Check whether a distance lies inside the window (inclusive)
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min_dist && distance <= self.max_dist
    }

    /// Centre of the window, the fallback estimate
    pub fn midpoint(&self) -> f32 {
        (self.min_dist + self.max_dist) / 2.0
    }

    /// Value assigned to out-of-range (diffuse) readings
    pub fn out_of_range(&self) -> f32 {
        self.max_dist + 1.0
    }

    fn validate(&self) -> ConfigResult<()> {
        let valid = self.min_dist.is_finite()
            && self.max_dist.is_finite()
            && self.min_dist > 0.0
            && self.min_dist < self.max_dist;

        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange { min: self.min_dist, max: self.max_dist })
        }
    }
}

impl Default for RangeLimits {
    fn default() -> Self {
        Self::new(ranging::MIN_DIST_CM, ranging::MAX_DIST_CM)
    }
}

/// How a round-trip echo time becomes a distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoConversion {
    /// `µs × 0.0343 / 2`, fractional centimetres
    SpeedOfSound,
    /// `µs / 58`, whole centimetres without floating point
    IntegerDivisor,
}

/// Acquisition parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangingConfig {
    /// Diffuse zone start (cm, exclusive)
    pub diffuse_start: f32,
    /// Diffuse zone end (cm, exclusive)
    pub diffuse_end: f32,
    /// Longest echo accepted
    pub echo_timeout: MicrosDurationU32,
    /// Time-to-distance conversion
    pub conversion: EchoConversion,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            diffuse_start: ranging::DIFFUSE_ZONE_START_CM,
            diffuse_end: ranging::DIFFUSE_ZONE_END_CM,
            echo_timeout: MicrosDurationU32::from_ticks(ranging::ECHO_TIMEOUT_US),
            conversion: EchoConversion::SpeedOfSound,
        }
    }
}

impl RangingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !(self.diffuse_start.is_finite()
            && self.diffuse_end.is_finite()
            && self.diffuse_start < self.diffuse_end)
        {
            return Err(ConfigError::InvalidDiffuseZone {
                start: self.diffuse_start,
                end: self.diffuse_end,
            });
        }

        if self.echo_timeout.ticks() == 0 {
            return Err(ConfigError::NonPositive { name: "echo_timeout", value: 0.0 });
        }

        Ok(())
    }
}

/// What the noise model does on cycles where fewer than two sensors report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DropoutPolicy {
    /// Treat the cycle as agreement and shrink the noise
    Shrink,
    /// Leave the noise untouched
    Hold,
}

/// Adaptive measurement-noise heuristic parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    /// Starting noise for both sensors
    pub initial: f32,
    /// Lower clamp
    pub min: f32,
    /// Upper clamp
    pub max: f32,
    /// Multiplier applied when sensors disagree (≥ 1)
    pub growth: f32,
    /// Multiplier applied otherwise (≤ 1)
    pub shrink: f32,
    /// Absolute difference above which the sensors disagree (cm)
    pub disagreement_threshold: f32,
    /// Behaviour when a sensor is missing
    pub dropout: DropoutPolicy,
}

impl NoiseConfig {
    /// Histogram defaults: sigma in cm
    pub fn histogram() -> Self {
        Self {
            initial: fusion::HISTOGRAM_INITIAL_SIGMA_CM,
            min: fusion::HISTOGRAM_SIGMA_MIN_CM,
            max: fusion::HISTOGRAM_SIGMA_MAX_CM,
            growth: fusion::HISTOGRAM_NOISE_GROWTH,
            shrink: fusion::HISTOGRAM_NOISE_SHRINK,
            disagreement_threshold: fusion::DISAGREEMENT_THRESHOLD_CM,
            dropout: DropoutPolicy::Shrink,
        }
    }

    /// Kalman defaults: variance in cm²
    pub fn kalman() -> Self {
        Self {
            initial: fusion::KALMAN_INITIAL_R,
            min: fusion::KALMAN_R_MIN,
            max: fusion::KALMAN_R_MAX,
            growth: fusion::KALMAN_NOISE_GROWTH,
            shrink: fusion::KALMAN_NOISE_SHRINK,
            disagreement_threshold: fusion::DISAGREEMENT_THRESHOLD_CM,
            dropout: DropoutPolicy::Shrink,
        }
    }

    /// Set the dropout policy
    pub fn with_dropout(mut self, dropout: DropoutPolicy) -> Self {
        self.dropout = dropout;
        self
    }

    /// Check bounds and factors
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("noise.min", self.min)?;
        ensure_positive("noise.max", self.max)?;

        if self.min > self.max {
            return Err(ConfigError::InvalidNoiseModel { reason: "min exceeds max" });
        }
        if !(self.initial >= self.min && self.initial <= self.max) {
            return Err(ConfigError::InvalidNoiseModel { reason: "initial outside bounds" });
        }
        if !(self.growth >= 1.0 && self.growth.is_finite()) {
            return Err(ConfigError::InvalidNoiseModel { reason: "growth must be >= 1" });
        }
        if !(self.shrink > 0.0 && self.shrink <= 1.0) {
            return Err(ConfigError::InvalidNoiseModel { reason: "shrink must be in (0, 1]" });
        }
        if !(self.disagreement_threshold >= 0.0 && self.disagreement_threshold.is_finite()) {
            return Err(ConfigError::InvalidNoiseModel { reason: "threshold must be >= 0" });
        }

        Ok(())
    }
}

/// Histogram filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramConfig {
    /// Bin spacing (cm)
    pub step: f32,
    /// Per-sensor sigma model
    pub noise: NoiseConfig,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            step: fusion::HISTOGRAM_STEP_CM,
            noise: NoiseConfig::histogram(),
        }
    }
}

impl HistogramConfig {
    /// Number of bins covering `limits` at this step
    ///
    /// Rounded rather than truncated so `(20 - 2) / 0.1` yields 181 bins
    /// despite binary floating point. Saturates at `usize::MAX` for steps
    /// too small to count.
    pub fn bin_count(&self, limits: &RangeLimits) -> usize {
        let intervals = libm::roundf((limits.max_dist - limits.min_dist) / self.step) as usize;
        intervals.saturating_add(1)
    }

    /// Check the step, grid size and noise model
    pub fn validate(&self, limits: &RangeLimits) -> ConfigResult<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ConfigError::InvalidStep { step: self.step });
        }

        let required = self.bin_count(limits);
        if required > fusion::MAX_HISTOGRAM_BINS {
            return Err(ConfigError::TooManyBins {
                required,
                capacity: fusion::MAX_HISTOGRAM_BINS,
            });
        }

        self.noise.validate()
    }
}

/// Scalar Kalman filter parameters (float and quantized)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanConfig {
    /// Prior estimate (cm)
    pub initial_estimate: f32,
    /// Prior variance (cm²)
    pub initial_variance: f32,
    /// Process noise q (cm²)
    pub process_noise: f32,
    /// Measurement noise model, r in cm²
    pub noise: NoiseConfig,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            initial_estimate: fusion::KALMAN_INITIAL_ESTIMATE_CM,
            initial_variance: fusion::KALMAN_INITIAL_VARIANCE,
            process_noise: fusion::KALMAN_PROCESS_NOISE,
            noise: NoiseConfig::kalman(),
        }
    }
}

impl KalmanConfig {
    /// Set process noise (higher = less trust in the constant-position model)
    pub fn with_process_noise(mut self, q: f32) -> Self {
        self.process_noise = q;
        self
    }

    /// Set the starting measurement noise for both sensors
    pub fn with_measurement_noise(mut self, r: f32) -> Self {
        self.noise.initial = r;
        self
    }

    /// Check prior and noise parameters
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.initial_estimate.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "initial_estimate",
                value: self.initial_estimate,
            });
        }
        ensure_positive("initial_variance", self.initial_variance)?;
        ensure_positive("process_noise", self.process_noise)?;
        self.noise.validate()
    }
}

/// How the gate judges the raw samples behind a fused estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorSanity {
    /// At least one sample is valid and inside the safe band
    AtLeastOne,
    /// At least one sample is valid and no valid sample is outside the
    /// safe band
    NoneUnsafe,
}

/// Safety gate thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Distance subtracted from `max_dist` to get the trigger limit (cm)
    pub safety_margin: f32,
    /// Spread of recent estimates must stay below this (cm)
    pub stability_threshold: f32,
    /// Estimator uncertainty must stay below this
    pub confidence_threshold: f32,
    /// Raw sample policy
    pub sensor_sanity: SensorSanity,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            safety_margin: safety::SAFETY_MARGIN_CM,
            stability_threshold: safety::STABILITY_THRESHOLD_CM,
            confidence_threshold: safety::CONFIDENCE_THRESHOLD,
            sensor_sanity: SensorSanity::AtLeastOne,
        }
    }
}

impl GateConfig {
    /// Highest distance at which triggering is permitted
    pub fn safe_max(&self, limits: &RangeLimits) -> f32 {
        limits.max_dist - self.safety_margin
    }

    /// Check thresholds against the distance window
    pub fn validate(&self, limits: &RangeLimits) -> ConfigResult<()> {
        let safe_max = self.safe_max(limits);
        if !(self.safety_margin >= 0.0 && safe_max >= limits.min_dist) {
            return Err(ConfigError::InvalidSafetyMargin {
                margin: self.safety_margin,
                min: limits.min_dist,
                max: limits.max_dist,
            });
        }

        ensure_positive("stability_threshold", self.stability_threshold)?;
        ensure_positive("confidence_threshold", self.confidence_threshold)
    }
}

/// Loop cadence and actuator dwell times
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Minimum time between measurement cycles
    pub read_interval: MillisDurationU32,
    /// Output high time
    pub on_duration: MillisDurationU32,
    /// Cool-down before re-arming
    pub off_duration: MillisDurationU32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            read_interval: MillisDurationU32::from_ticks(timing::READ_INTERVAL_MS),
            on_duration: MillisDurationU32::from_ticks(timing::ON_DURATION_MS),
            off_duration: MillisDurationU32::from_ticks(timing::OFF_DURATION_MS),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemConfig {
    /// Distance window
    pub limits: RangeLimits,
    /// Acquisition
    pub ranging: RangingConfig,
    /// Histogram estimator
    pub histogram: HistogramConfig,
    /// Kalman estimators
    pub kalman: KalmanConfig,
    /// Safety gate
    pub gate: GateConfig,
    /// Loop and actuator timing
    pub timing: TimingConfig,
}

impl SystemConfig {
    /// 15 cm rig: tighter window, 0.6 cm margin (14.4 cm limit), diffuse
    /// zone 14.6-17 cm
    pub fn short_range() -> Self {
        Self::default()
            .with_limits(ranging::MIN_DIST_CM, ranging::SHORT_RANGE_MAX_DIST_CM)
            .with_safety_margin(safety::SHORT_RANGE_SAFETY_MARGIN_CM)
            .with_diffuse_zone(
                ranging::SHORT_RANGE_DIFFUSE_START_CM,
                ranging::SHORT_RANGE_DIFFUSE_END_CM,
            )
    }

    /// Set the distance window
    pub fn with_limits(mut self, min_dist: f32, max_dist: f32) -> Self {
        self.limits = RangeLimits::new(min_dist, max_dist);
        self
    }

    /// Set the safety margin
    pub fn with_safety_margin(mut self, margin: f32) -> Self {
        self.gate.safety_margin = margin;
        self
    }

    /// Set the diffuse zone
    pub fn with_diffuse_zone(mut self, start: f32, end: f32) -> Self {
        self.ranging.diffuse_start = start;
        self.ranging.diffuse_end = end;
        self
    }

    /// Select the echo conversion
    pub fn with_conversion(mut self, conversion: EchoConversion) -> Self {
        self.ranging.conversion = conversion;
        self
    }

    /// Select the gate's raw-sample policy
    pub fn with_sensor_sanity(mut self, sanity: SensorSanity) -> Self {
        self.gate.sensor_sanity = sanity;
        self
    }

    /// Set actuator dwell times in milliseconds
    pub fn with_dwell_times(mut self, on_ms: u32, off_ms: u32) -> Self {
        self.timing.on_duration = MillisDurationU32::from_ticks(on_ms);
        self.timing.off_duration = MillisDurationU32::from_ticks(off_ms);
        self
    }

    /// Set the measurement interval in milliseconds
    pub fn with_read_interval(mut self, interval_ms: u32) -> Self {
        self.timing.read_interval = MillisDurationU32::from_ticks(interval_ms);
        self
    }

    /// Check every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.limits.validate()?;
        self.ranging.validate()?;
        self.histogram.validate(&self.limits)?;
        self.kalman.validate()?;
        self.gate.validate(&self.limits)
    }
}
