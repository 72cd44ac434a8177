//! Safety Gate
//!
//! Decides whether the actuator may fire this cycle. Every criterion must
//! hold; when one fails the gate reports the *first* failing one in a fixed
//! priority order, so a refusal always has exactly one reason:
//!
//! | # | Criterion      | Holds when                                         |
//! |---|----------------|----------------------------------------------------|
//! | 1 | range          | `min_dist ≤ estimate ≤ safe_max`                   |
//! | 2 | history        | every recorded estimate `≤ safe_max`               |
//! | 3 | stability      | `variation < stability_threshold`                  |
//! | 4 | confidence     | `uncertainty < confidence_threshold`               |
//! | 5 | already active | actuator is [`ActuatorPhase::Off`]                 |
//! | 6 | sensor sanity  | per [`SensorSanity`], see below                    |
//!
//! with `safe_max = max_dist - safety_margin`.
//!
//! ## Sensor sanity
//!
//! The fused estimate can look fine while the raw readings behind it do
//! not. [`SensorSanity::AtLeastOne`] requires one sample with a value in
//! `(0, safe_max]`. [`SensorSanity::NoneUnsafe`] additionally refuses when
//! any sample carries a value above `safe_max`, including diffuse-zone
//! readings.
//!
//! ## NaN
//!
//! Every comparison is written so that NaN fails it. A poisoned estimate,
//! uncertainty or history entry closes the gate.

use thiserror_no_std::Error;

use crate::{
    acquisition::Sample,
    actuation::ActuatorPhase,
    buffer::EstimateHistory,
    config::{GateConfig, RangeLimits, SensorSanity},
};

/// Why the gate refused, in priority order
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    /// Estimate outside `[min_dist, safe_max]`
    #[error("estimate out of safe range")]
    OutOfRange,
    /// A recent estimate exceeded `safe_max`
    #[error("history contains unsafe estimate")]
    HistoryUnsafe,
    /// Recent estimates spread too far
    #[error("estimate unstable")]
    Unstable,
    /// Estimator too uncertain
    #[error("uncertainty too high")]
    LowConfidence,
    /// Actuator is on or cooling down
    #[error("actuator already active")]
    AlreadyActive,
    /// Raw samples do not support the estimate
    #[error("no sensor confirms a safe reading")]
    SensorsUnsafe,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Rejection {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange => defmt::write!(fmt, "out of range"),
            Self::HistoryUnsafe => defmt::write!(fmt, "history unsafe"),
            Self::Unstable => defmt::write!(fmt, "unstable"),
            Self::LowConfidence => defmt::write!(fmt, "low confidence"),
            Self::AlreadyActive => defmt::write!(fmt, "already active"),
            Self::SensorsUnsafe => defmt::write!(fmt, "sensors unsafe"),
        }
    }
}

/// Everything one gate decision looks at
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a, const N: usize> {
    /// Fused distance (cm)
    pub estimate: f32,
    /// Estimator uncertainty
    pub uncertainty: f32,
    /// Recent estimates, including this cycle's
    pub history: &'a EstimateHistory<N>,
    /// This cycle's raw samples
    pub samples: [Sample; 2],
    /// Current actuator phase
    pub phase: ActuatorPhase,
}

/// Multi-criterion trigger permission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyGate {
    limits: RangeLimits,
    config: GateConfig,
}

impl SafetyGate {
    /// Create a gate for a distance window
    pub fn new(limits: RangeLimits, config: GateConfig) -> Self {
        Self { limits, config }
    }

    /// Highest distance at which triggering is permitted
    pub fn safe_max(&self) -> f32 {
        self.config.safe_max(&self.limits)
    }

    /// Thresholds in use
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// First failing criterion, or `Ok` if the actuator may fire
    pub fn check<const N: usize>(&self, input: &GateInput<'_, N>) -> Result<(), Rejection> {
        let safe_max = self.safe_max();

        if !(input.estimate >= self.limits.min_dist && input.estimate <= safe_max) {
            return Err(Rejection::OutOfRange);
        }

        if !input.history.all_at_most(safe_max) {
            return Err(Rejection::HistoryUnsafe);
        }

        if !(input.history.variation() < self.config.stability_threshold) {
            return Err(Rejection::Unstable);
        }

        if !(input.uncertainty < self.config.confidence_threshold) {
            return Err(Rejection::LowConfidence);
        }

        if input.phase != ActuatorPhase::Off {
            return Err(Rejection::AlreadyActive);
        }

        if !self.sensors_sane(&input.samples, safe_max) {
            return Err(Rejection::SensorsUnsafe);
        }

        Ok(())
    }

    /// Boolean form of [`check`](Self::check)
    pub fn may_trigger<const N: usize>(&self, input: &GateInput<'_, N>) -> bool {
        self.check(input).is_ok()
    }

    fn sensors_sane(&self, samples: &[Sample; 2], safe_max: f32) -> bool {
        let confirmed = samples.iter().any(|s| s.is_within(safe_max));

        match self.config.sensor_sanity {
            SensorSanity::AtLeastOne => confirmed,
            SensorSanity::NoneUnsafe => {
                confirmed
                    && samples
                        .iter()
                        .filter_map(Sample::distance)
                        .all(|d| d <= safe_max)
            }
        }
    }
}
