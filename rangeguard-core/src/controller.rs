//! Control Loop
//!
//! ## Overview
//!
//! One cycle flows strictly one way:
//!
//! ```text
//! sensor 1 ─┐
//!           ├─► samples ─► estimator ─► history ─► gate ─► actuator
//! sensor 2 ─┘               (noise)     (variation)
//! ```
//!
//! [`FusionCore`] is the hardware-free part: samples in, [`CycleRecord`]
//! out. [`Controller`] owns the sensors, the output pin and the schedule
//! on top of it. Every piece of state lives in these two structs and is
//! mutated through `&mut self`, so there is exactly one writer.
//!
//! ## Scheduling
//!
//! [`Controller::poll`] is meant to be called as often as the main loop
//! spins. A measurement cycle runs only when `read_interval` has elapsed
//! since the previous one (the first poll always measures); the actuator's
//! dwell timers advance on every poll. At most one actuator transition
//! happens per poll.
//!
//! ## Example
//!
//! ```rust
//! use rangeguard_core::config::SystemConfig;
//! use rangeguard_core::controller::Controller;
//! use rangeguard_core::fusion::KalmanFilter;
//! use rangeguard_core::traits::{EchoSensor, OutputLine};
//!
//! struct Target(u32);
//! impl EchoSensor for Target {
//!     type Error = ();
//!     fn ping(&mut self, _timeout: u32) -> nb::Result<Option<u32>, ()> {
//!         Ok(Some(self.0))
//!     }
//! }
//!
//! struct Led(bool);
//! impl OutputLine for Led {
//!     fn set_high(&mut self) { self.0 = true; }
//!     fn set_low(&mut self) { self.0 = false; }
//! }
//!
//! let config = SystemConfig::default();
//! let kalman = KalmanFilter::new(config.limits, config.kalman)?;
//! // 292 µs round trip is about 5 cm
//! let mut controller: Controller<_, _, _, _> =
//!     Controller::new(&config, kalman, Target(292), Target(292), Led(false))?;
//!
//! let mut fired = false;
//! for tick in 0..100u32 {
//!     let out = controller.poll(tick * 10);
//!     fired |= out.record.map_or(false, |r| r.triggered);
//! }
//! assert!(fired);
//! # Ok::<(), rangeguard_core::errors::ConfigError>(())
//! ```

use crate::{
    acquisition::{RangeFinder, Sample},
    actuation::{Actuator, ActuatorPhase, ActuatorState, Transition},
    buffer::EstimateHistory,
    config::SystemConfig,
    constants::HISTORY_SIZE,
    errors::ConfigResult,
    events::CycleRecord,
    fusion::FusionOutcome,
    gate::{GateInput, SafetyGate},
    time::{elapsed, Millis},
    traits::{EchoSensor, OutputLine, RangeEstimator},
};

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollOutput {
    /// Present when a measurement cycle ran
    pub record: Option<CycleRecord>,
    /// Actuator state change, if any
    pub transition: Option<Transition>,
}

/// Estimator, history and gate: the hardware-free cycle
#[derive(Debug, Clone)]
pub struct FusionCore<E, const H: usize = HISTORY_SIZE> {
    estimator: E,
    history: EstimateHistory<H>,
    gate: SafetyGate,
}

impl<E: RangeEstimator, const H: usize> FusionCore<E, H> {
    /// Assemble from an estimator and a gate
    pub fn new(estimator: E, gate: SafetyGate) -> Self {
        Self {
            estimator,
            history: EstimateHistory::new(),
            gate,
        }
    }

    /// Fuse one cycle and ask the gate
    ///
    /// The returned record carries the gate's decision; `triggered` is left
    /// for the caller to set once the actuator actually fired.
    pub fn process(&mut self, now: Millis, samples: [Sample; 2], phase: ActuatorPhase) -> CycleRecord {
        let estimate = self.estimator.update(samples[0].distance(), samples[1].distance());
        self.history.record(estimate.distance);
        let variation = self.history.variation();

        let mut record = CycleRecord::new(now, samples, &estimate, variation, self.estimator.noise());

        if record.dual_dropout() {
            log_warn!("no echo from either sensor at t={}", now);
        }
        if estimate.outcome == FusionOutcome::BeliefReset {
            log_warn!("{} belief reset at t={}", self.estimator.name(), now);
        }

        let input = GateInput {
            estimate: estimate.distance,
            uncertainty: estimate.uncertainty,
            history: &self.history,
            samples,
            phase,
        };
        record.rejection = self.gate.check(&input).err();

        record
    }

    /// Estimator in use
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Recent estimates
    pub fn history(&self) -> &EstimateHistory<H> {
        &self.history
    }

    /// Gate in use
    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    /// Estimator back to its prior, history emptied
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.history.clear();
    }

    /// Take the estimator back
    pub fn into_estimator(self) -> E {
        self.estimator
    }
}

/// Complete engine: two sensors, one estimator, one output
pub struct Controller<E, A, B, P, const H: usize = HISTORY_SIZE> {
    core: FusionCore<E, H>,
    sensor1: RangeFinder<A>,
    sensor2: RangeFinder<B>,
    actuator: Actuator<P>,
    config: SystemConfig,
    last_read: Option<Millis>,
}

impl<E, A, B, P, const H: usize> Controller<E, A, B, P, H>
where
    E: RangeEstimator,
    A: EchoSensor,
    B: EchoSensor,
    P: OutputLine,
{
    /// Validate `config` and take ownership of the hardware
    ///
    /// The output is driven low immediately.
    pub fn new(
        config: &SystemConfig,
        estimator: E,
        sensor1: A,
        sensor2: B,
        pin: P,
    ) -> ConfigResult<Self> {
        config.validate()?;

        log_info!(
            "controller up: {} estimator, safe max {} cm, history {}",
            estimator.name(),
            config.gate.safe_max(&config.limits),
            H
        );

        Ok(Self {
            core: FusionCore::new(estimator, SafetyGate::new(config.limits, config.gate)),
            sensor1: RangeFinder::new(sensor1, 1, config.limits, config.ranging),
            sensor2: RangeFinder::new(sensor2, 2, config.limits, config.ranging),
            actuator: Actuator::new(pin, config.timing),
            config: *config,
            last_read: None,
        })
    }

    /// Spin once: measure if due, advance the actuator
    pub fn poll(&mut self, now: Millis) -> PollOutput {
        let due = match self.last_read {
            None => true,
            Some(last) => elapsed(now, last) >= self.config.timing.read_interval.ticks(),
        };

        let mut output = PollOutput::default();
        if due {
            self.last_read = Some(now);
            let samples = [self.sensor1.measure(), self.sensor2.measure()];
            output = self.run_cycle(samples, now);
        }

        if output.transition.is_none() {
            output.transition = self.actuator.tick(now);
        }

        output
    }

    /// One measurement cycle on samples already acquired
    ///
    /// Fires the actuator when the gate allows it. Does not advance dwell
    /// timers; [`poll`](Self::poll) does that.
    pub fn run_cycle(&mut self, samples: [Sample; 2], now: Millis) -> PollOutput {
        let mut record = self.core.process(now, samples, self.actuator.phase());

        let transition = if record.gate_open() {
            let transition = self.actuator.trigger(now);
            record.triggered = transition == Some(Transition::Activated);
            transition
        } else {
            None
        };

        log_debug!("{}", record);

        PollOutput {
            record: Some(record),
            transition,
        }
    }

    /// Restart state: prior estimate, empty history, output off
    pub fn reset(&mut self) {
        self.core.reset();
        self.actuator.reset();
        self.last_read = None;
        log_info!("controller reset");
    }

    /// Estimator in use
    pub fn estimator(&self) -> &E {
        self.core.estimator()
    }

    /// Recent estimates
    pub fn history(&self) -> &EstimateHistory<H> {
        self.core.history()
    }

    /// Actuator state with timestamps
    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator.state()
    }

    /// Actuator phase
    pub fn phase(&self) -> ActuatorPhase {
        self.actuator.phase()
    }

    /// Configuration in use
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Tear down and return the parts
    pub fn release(self) -> (E, A, B, P) {
        (
            self.core.into_estimator(),
            self.sensor1.release(),
            self.sensor2.release(),
            self.actuator.release(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{HistogramFilter, KalmanFilter};
    use crate::gate::Rejection;

    fn kalman_core() -> FusionCore<KalmanFilter> {
        let config = SystemConfig::default();
        FusionCore::new(
            KalmanFilter::new(config.limits, config.kalman).unwrap(),
            SafetyGate::new(config.limits, config.gate),
        )
    }

    #[test]
    fn core_settles_then_opens_gate() {
        let mut core = kalman_core();
        let samples = [Sample::Valid(5.0); 2];

        let mut last = core.process(0, samples, ActuatorPhase::Off);
        for t in 1..60 {
            last = core.process(t * 10, samples, ActuatorPhase::Off);
        }
        assert_eq!(last.rejection, None);
        assert!(!last.triggered);
        assert_eq!(core.history().len(), 5);

        let jump = core.process(600, [Sample::Valid(12.0); 2], ActuatorPhase::Off);
        assert_eq!(jump.rejection, Some(Rejection::Unstable));
    }

    #[test]
    fn core_reports_dual_dropout() {
        let mut core = kalman_core();
        let record = core.process(0, [Sample::NoEcho; 2], ActuatorPhase::Off);
        assert!(record.dual_dropout());
        assert_eq!(record.outcome, FusionOutcome::NoMeasurement);
        assert_eq!(record.rejection, Some(Rejection::LowConfidence));
    }

    #[test]
    fn core_reset_clears_history() {
        let config = SystemConfig::default();
        let histogram = HistogramFilter::new(config.limits, config.histogram).unwrap();
        let mut core: FusionCore<_, 3> =
            FusionCore::new(histogram, SafetyGate::new(config.limits, config.gate));

        core.process(0, [Sample::Valid(7.0); 2], ActuatorPhase::Off);
        core.reset();
        assert!(core.history().is_empty());
        assert_eq!(core.estimator().current().outcome, FusionOutcome::NoMeasurement);
    }
}
