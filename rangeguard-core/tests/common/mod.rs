//! Common test utilities for integration tests
//!
//! This module provides:
//! - Scripted echo sensors replaying a fixed sequence of results
//! - A recording output line
//! - Distance/echo-time helpers and a deterministic noise source

#![allow(dead_code)]

use std::collections::VecDeque;

use rangeguard_core::{
    config::SystemConfig,
    constants::SPEED_OF_SOUND_CM_PER_US,
    traits::{EchoSensor, OutputLine},
};

/// Round-trip echo time (µs) for a target at `cm`
pub fn echo_us(cm: f32) -> u32 {
    libm::roundf(cm * 2.0 / SPEED_OF_SOUND_CM_PER_US) as u32
}

/// Driver fault raised by [`ScriptedSensor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverFault;

/// One scripted ping result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Echo {
    /// Target at this distance (cm)
    At(f32),
    /// Raw round-trip time (µs)
    Raw(u32),
    /// No echo before the timeout
    Silent,
    /// Driver error
    Fault,
}

/// Echo sensor replaying a script, then repeating its last entry
pub struct ScriptedSensor {
    script: VecDeque<Echo>,
    last: Echo,
    /// Polls answered with `WouldBlock` before each result
    pub pending: u8,
    countdown: u8,
    /// Completed pings
    pub pings: usize,
}

impl ScriptedSensor {
    /// Sensor that always sees a target at `cm`
    pub fn constant(cm: f32) -> Self {
        Self::script([Echo::At(cm)])
    }

    /// Sensor replaying `script`
    pub fn script<I: IntoIterator<Item = Echo>>(script: I) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: Echo::Silent,
            pending: 0,
            countdown: 0,
            pings: 0,
        }
    }

    /// Queue more results
    pub fn push(&mut self, echo: Echo) {
        self.script.push_back(echo);
    }

    /// Answer each ping with `WouldBlock` this many times first
    pub fn with_pending(mut self, pending: u8) -> Self {
        self.pending = pending;
        self.countdown = pending;
        self
    }
}

impl EchoSensor for ScriptedSensor {
    type Error = DriverFault;

    fn ping(&mut self, _timeout_us: u32) -> nb::Result<Option<u32>, DriverFault> {
        if self.countdown > 0 {
            self.countdown -= 1;
            return Err(nb::Error::WouldBlock);
        }
        self.countdown = self.pending;
        self.pings += 1;

        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }

        match self.last {
            Echo::At(cm) => Ok(Some(echo_us(cm))),
            Echo::Raw(us) => Ok(Some(us)),
            Echo::Silent => Ok(None),
            Echo::Fault => Err(nb::Error::Other(DriverFault)),
        }
    }
}

/// Output line remembering every level written
#[derive(Debug, Default)]
pub struct RecordingLine {
    /// Current level
    pub high: bool,
    /// Every write in order
    pub writes: Vec<bool>,
}

impl RecordingLine {
    /// Number of rising edges written
    pub fn activations(&self) -> usize {
        self.writes.windows(2).filter(|w| !w[0] && w[1]).count()
            + usize::from(self.writes.first() == Some(&true))
    }
}

impl OutputLine for RecordingLine {
    fn set_high(&mut self) {
        self.high = true;
        self.writes.push(true);
    }

    fn set_low(&mut self) {
        self.high = false;
        self.writes.push(false);
    }
}

/// Deterministic LCG noise source
pub struct TestRng {
    seed: u32,
}

impl TestRng {
    /// Seeded generator
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Uniform in `[0, 1)`
    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.seed >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[-amplitude, amplitude)`
    pub fn noise(&mut self, amplitude: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * amplitude
    }
}

/// Reference rig configuration, validated
pub fn reference_config() -> SystemConfig {
    let config = SystemConfig::default();
    config.validate().expect("reference config is valid");
    config
}
