//! Actuation State Machine
//!
//! ```text
//!            trigger (gate granted)
//!   ┌─────┐ ─────────────────────────► ┌──────────────┐
//!   │ Off │                             │ On { since } │  output high
//!   └─────┘ ◄──────┐                    └──────────────┘
//!                  │                           │ now - since ≥ on_duration
//!                  │                           ▼
//!                  │  now - since ≥      ┌───────────────────┐
//!                  └──── off_duration ── │ WaitOff { since } │  output low
//!                                        └───────────────────┘
//! ```
//!
//! [`ActuatorState`] is plain data with pure transition functions; the
//! [`Actuator`] wrapper drives an [`OutputLine`] to match. Elapsed time is
//! always computed with [`elapsed`], so the machine keeps working across the
//! `u32` millisecond rollover (about every 49.7 days).

use crate::config::TimingConfig;
use crate::time::{elapsed, Millis};
use crate::traits::OutputLine;

/// State tag without timestamps, as seen by the safety gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorPhase {
    /// Idle, may be triggered
    Off,
    /// Output high
    On,
    /// Cooling down, output low
    WaitOff,
}

/// A state change, reported for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// `Off → On`: output driven high
    Activated,
    /// `On → WaitOff`: output driven low
    Released,
    /// `WaitOff → Off`: ready for the next trigger
    Rearmed,
}

/// Actuator state with entry timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActuatorState {
    /// Idle
    #[default]
    Off,
    /// Output high since the given time
    On {
        /// Entry time (ms)
        since: Millis,
    },
    /// Cool-down since the given time
    WaitOff {
        /// Entry time (ms)
        since: Millis,
    },
}

impl ActuatorState {
    /// Phase without timestamp
    pub fn phase(&self) -> ActuatorPhase {
        match self {
            ActuatorState::Off => ActuatorPhase::Off,
            ActuatorState::On { .. } => ActuatorPhase::On,
            ActuatorState::WaitOff { .. } => ActuatorPhase::WaitOff,
        }
    }

    /// Whether the output should be high
    pub fn is_output_high(&self) -> bool {
        matches!(self, ActuatorState::On { .. })
    }

    /// Granted trigger; only `Off` reacts
    pub fn trigger(self, now: Millis) -> (Self, Option<Transition>) {
        match self {
            ActuatorState::Off => (ActuatorState::On { since: now }, Some(Transition::Activated)),
            other => (other, None),
        }
    }

    /// Time-driven step, at most one transition
    pub fn advance(self, now: Millis, timing: &TimingConfig) -> (Self, Option<Transition>) {
        match self {
            ActuatorState::On { since } if elapsed(now, since) >= timing.on_duration.ticks() => {
                (ActuatorState::WaitOff { since: now }, Some(Transition::Released))
            }
            ActuatorState::WaitOff { since } if elapsed(now, since) >= timing.off_duration.ticks() => {
                (ActuatorState::Off, Some(Transition::Rearmed))
            }
            other => (other, None),
        }
    }
}

/// [`ActuatorState`] bound to an output pin
pub struct Actuator<P> {
    pin: P,
    state: ActuatorState,
    timing: TimingConfig,
}

impl<P: OutputLine> Actuator<P> {
    /// Take the pin and drive it low
    pub fn new(mut pin: P, timing: TimingConfig) -> Self {
        pin.set_low();
        Self { pin, state: ActuatorState::Off, timing }
    }

    /// Fire if idle
    pub fn trigger(&mut self, now: Millis) -> Option<Transition> {
        let (state, transition) = self.state.trigger(now);
        self.apply(state, transition)
    }

    /// Let dwell times run
    pub fn tick(&mut self, now: Millis) -> Option<Transition> {
        let (state, transition) = self.state.advance(now, &self.timing);
        self.apply(state, transition)
    }

    fn apply(&mut self, state: ActuatorState, transition: Option<Transition>) -> Option<Transition> {
        self.state = state;
        match transition {
            Some(Transition::Activated) => {
                self.pin.set_high();
                log_info!("actuator on");
            }
            Some(Transition::Released) => {
                self.pin.set_low();
                log_info!("actuator off, cooling down");
            }
            Some(Transition::Rearmed) => {
                log_info!("actuator re-armed");
            }
            None => {}
        }
        transition
    }

    /// Current state
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Current phase
    pub fn phase(&self) -> ActuatorPhase {
        self.state.phase()
    }

    /// Back to `Off` with the output low
    pub fn reset(&mut self) {
        self.pin.set_low();
        self.state = ActuatorState::Off;
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}
