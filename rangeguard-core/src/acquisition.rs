//! Ranging Acquisition
//!
//! Turns one echo measurement into a classified [`Sample`].
//!
//! ## Pipeline
//!
//! ```text
//! ping ──► duration µs ──► distance cm ──► diffuse zone? ──► clamp
//!   │          │                               │               │
//!   │       0 or ≥ timeout                   yes               │
//!   ▼          ▼                               ▼               ▼
//! error ──► NoEcho                      Ambiguous(max+1)   Valid(d)
//! ```
//!
//! ## Diffuse zone
//!
//! HC-SR04 class sensors respond unreliably just past their reliable range:
//! a target there may echo at a plausible-looking shorter distance or not at
//! all. Readings strictly inside `(diffuse_start, diffuse_end)` are
//! therefore never trusted. They become [`Sample::Ambiguous`] carrying
//! `max_dist + 1`, which is deliberately *not* clamped back into the window:
//! the estimator sees a reading beyond the far end and the estimate moves
//! out of the safe band.
//!
//! ## Blocking
//!
//! [`RangeFinder::measure`] blocks until the driver finishes, bounded by the
//! echo timeout (25 ms by default). It takes `&mut self`, so a second
//! measurement on the same sensor cannot start while one is outstanding.

use crate::config::{EchoConversion, RangeLimits, RangingConfig};
use crate::constants::ranging::{ECHO_US_PER_CM, SPEED_OF_SOUND_CM_PER_US};
use crate::traits::EchoSensor;

/// One sensor's reading for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sample {
    /// Echo received, distance clamped into the window (cm)
    Valid(f32),
    /// Echo landed in the diffuse zone; value is beyond `max_dist` (cm)
    Ambiguous(f32),
    /// No usable echo this cycle
    NoEcho,
}

impl Sample {
    /// Distance handed to the estimator, `None` without an echo
    pub fn distance(&self) -> Option<f32> {
        match *self {
            Sample::Valid(d) | Sample::Ambiguous(d) => Some(d),
            Sample::NoEcho => None,
        }
    }

    /// Whether an echo was received at all
    pub fn has_echo(&self) -> bool {
        !matches!(self, Sample::NoEcho)
    }

    /// Whether the reading was reclassified by the diffuse zone
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Sample::Ambiguous(_))
    }

    /// Whether this is a positive reading at or below `limit`
    pub fn is_within(&self, limit: f32) -> bool {
        match self.distance() {
            Some(d) => d > 0.0 && d <= limit,
            None => false,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sample {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Sample::Valid(d) => defmt::write!(fmt, "{}", d),
            Sample::Ambiguous(d) => defmt::write!(fmt, "{}?", d),
            Sample::NoEcho => defmt::write!(fmt, "--"),
        }
    }
}

impl core::fmt::Display for Sample {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Sample::Valid(d) => write!(f, "{:.2}", d),
            Sample::Ambiguous(d) => write!(f, "{:.2}?", d),
            Sample::NoEcho => f.write_str("--"),
        }
    }
}

/// Convert a round-trip echo time to a one-way distance (cm)
pub fn echo_to_distance(duration_us: u32, conversion: EchoConversion) -> f32 {
    match conversion {
        EchoConversion::SpeedOfSound => duration_us as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0,
        EchoConversion::IntegerDivisor => (duration_us / ECHO_US_PER_CM) as f32,
    }
}

/// Classify a raw distance: diffuse-zone rejection, then clamping
pub fn classify(distance_cm: f32, limits: &RangeLimits, ranging: &RangingConfig) -> Sample {
    if !distance_cm.is_finite() || distance_cm <= 0.0 {
        return Sample::NoEcho;
    }

    reclassify(distance_cm, limits, ranging)
}

fn reclassify(distance_cm: f32, limits: &RangeLimits, ranging: &RangingConfig) -> Sample {
    if distance_cm > ranging.diffuse_start && distance_cm < ranging.diffuse_end {
        return Sample::Ambiguous(limits.out_of_range());
    }

    Sample::Valid(limits.clamp(distance_cm))
}

/// Classify a driver result
///
/// `None`, a zero duration and anything at or past the timeout all mean
/// "no echo". Any other duration is an echo, even one that converts to
/// 0 cm under the integer divisor; it clamps to `min_dist`.
pub fn sample_from_echo(
    duration_us: Option<u32>,
    limits: &RangeLimits,
    ranging: &RangingConfig,
) -> Sample {
    match duration_us {
        Some(us) if us > 0 && us < ranging.echo_timeout.ticks() => {
            reclassify(echo_to_distance(us, ranging.conversion), limits, ranging)
        }
        _ => Sample::NoEcho,
    }
}

/// One ultrasonic sensor plus its classification rules
pub struct RangeFinder<S> {
    sensor: S,
    channel: u8,
    limits: RangeLimits,
    ranging: RangingConfig,
}

impl<S: EchoSensor> RangeFinder<S> {
    /// Wrap a driver; `channel` only labels diagnostics
    pub fn new(sensor: S, channel: u8, limits: RangeLimits, ranging: RangingConfig) -> Self {
        Self { sensor, channel, limits, ranging }
    }

    /// Measure once, blocking for at most the echo timeout
    ///
    /// Timeouts and driver faults are recovered here: they produce
    /// [`Sample::NoEcho`] and are never propagated.
    pub fn measure(&mut self) -> Sample {
        let timeout_us = self.ranging.echo_timeout.ticks();

        let duration = match nb::block!(self.sensor.ping(timeout_us)) {
            Ok(duration) => duration,
            Err(_) => {
                log_warn!("sensor {}: driver fault, treating as no echo", self.channel);
                None
            }
        };

        let sample = sample_from_echo(duration, &self.limits, &self.ranging);
        if let Sample::Ambiguous(_) = sample {
            log_warn!("sensor {}: reading in diffuse zone, treated as out of range", self.channel);
        }
        sample
    }

    /// Diagnostic channel number
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Give the driver back
    pub fn release(self) -> S {
        self.sensor
    }
}
