//! Cycle Records
//!
//! ## Overview
//!
//! Every measurement cycle produces one [`CycleRecord`]: what both sensors
//! reported, what the estimator made of it, and what the gate decided.
//! The core never formats or transmits records itself. They are returned
//! from [`Controller::poll`](crate::controller::Controller::poll) and a
//! separate concern decides what to do with them:
//!
//! - `Display` renders a compact one-line form for `log` or a serial port
//! - `defmt::Format` (feature `defmt`) for RTT logging on targets
//! - `serde::Serialize` (feature `serde`) for host-side capture
//!
//! ## Memory
//!
//! A record is `Copy` and lives on the stack. It holds only scalars and
//! small enums:
//!
//! ```text
//! timestamp     4 bytes
//! samples       2 × 8 bytes
//! estimate      12 bytes (distance, uncertainty, outcome)
//! variation     4 bytes
//! noise         8 bytes
//! rejection     2 bytes
//! triggered     1 byte
//! ```
//!
//! ## Anomalies
//!
//! Degraded cycles are not errors, but a record makes them visible:
//! a dual dropout shows as two [`Sample::NoEcho`], diffuse readings as
//! [`Sample::Ambiguous`], and a belief collapse as
//! [`FusionOutcome::BeliefReset`].

use core::fmt;

use crate::{
    acquisition::Sample,
    fusion::{Estimate, FusionOutcome},
    gate::Rejection,
    time::Millis,
};

/// Snapshot of one measurement cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleRecord {
    /// When the cycle ran (ms, wrapping)
    pub timestamp: Millis,
    /// Sensor 1 and sensor 2
    pub samples: [Sample; 2],
    /// Fused distance (cm)
    pub estimate: f32,
    /// Estimator uncertainty
    pub uncertainty: f32,
    /// Spread of recent estimates (cm)
    pub variation: f32,
    /// Per-sensor noise parameters after this cycle
    pub noise: [f32; 2],
    /// What the estimator did
    pub outcome: FusionOutcome,
    /// Gate refusal, `None` when the gate allowed triggering
    pub rejection: Option<Rejection>,
    /// Whether this cycle fired the actuator
    pub triggered: bool,
}

impl CycleRecord {
    /// Record a cycle's estimate before the gate has been consulted
    pub fn new(
        timestamp: Millis,
        samples: [Sample; 2],
        estimate: &Estimate,
        variation: f32,
        noise: [f32; 2],
    ) -> Self {
        Self {
            timestamp,
            samples,
            estimate: estimate.distance,
            uncertainty: estimate.uncertainty,
            variation,
            noise,
            outcome: estimate.outcome,
            rejection: None,
            triggered: false,
        }
    }

    /// Neither sensor produced an echo
    pub fn dual_dropout(&self) -> bool {
        self.samples.iter().all(|s| !s.has_echo())
    }

    /// Number of diffuse-zone readings this cycle
    pub fn diffuse_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_ambiguous()).count()
    }

    /// Whether the gate allowed triggering
    pub fn gate_open(&self) -> bool {
        self.rejection.is_none()
    }

    /// Something degraded this cycle
    pub fn is_anomalous(&self) -> bool {
        self.dual_dropout()
            || self.diffuse_count() > 0
            || self.outcome == FusionOutcome::BeliefReset
    }
}

impl fmt::Display for CycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} z1={} z2={} est={:.2} unc={:.3} var={:.2} r=[{:.2},{:.2}]",
            self.timestamp,
            self.samples[0],
            self.samples[1],
            self.estimate,
            self.uncertainty,
            self.variation,
            self.noise[0],
            self.noise[1],
        )?;

        match (self.triggered, self.rejection) {
            (true, _) => f.write_str(" -> TRIGGER"),
            (false, Some(reason)) => write!(f, " -> {}", reason),
            (false, None) => Ok(()),
        }?;

        if self.dual_dropout() {
            f.write_str(" [no reading]")?;
        }
        if self.outcome == FusionOutcome::BeliefReset {
            f.write_str(" [belief reset]")?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CycleRecord {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "t={} z1={} z2={} est={} unc={} var={} trig={}",
            self.timestamp,
            self.samples[0],
            self.samples[1],
            self.estimate,
            self.uncertainty,
            self.variation,
            self.triggered,
        );
        if let Some(reason) = self.rejection {
            defmt::write!(fmt, " rej={}", reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate() -> Estimate {
        Estimate {
            distance: 5.0,
            uncertainty: 0.1,
            outcome: FusionOutcome::Fused(2),
        }
    }

    #[test]
    fn record_size() {
        assert!(core::mem::size_of::<CycleRecord>() <= 64);
    }

    #[test]
    fn anomaly_helpers() {
        let record = CycleRecord::new(0, [Sample::NoEcho, Sample::NoEcho], &estimate(), 0.0, [0.5; 2]);
        assert!(record.dual_dropout());
        assert!(record.is_anomalous());
        assert!(record.gate_open());

        let record = CycleRecord::new(
            0,
            [Sample::Ambiguous(21.0), Sample::Valid(5.0)],
            &estimate(),
            0.0,
            [0.5; 2],
        );
        assert!(!record.dual_dropout());
        assert_eq!(record.diffuse_count(), 1);

        let clean = CycleRecord::new(0, [Sample::Valid(5.0); 2], &estimate(), 0.0, [0.5; 2]);
        assert!(!clean.is_anomalous());
    }

    #[test]
    fn display_line() {
        let mut record = CycleRecord::new(
            1000,
            [Sample::Valid(5.0), Sample::NoEcho],
            &estimate(),
            0.05,
            [0.5, 0.5],
        );
        record.rejection = Some(Rejection::Unstable);

        let line = record.to_string();
        assert!(line.starts_with("t=1000 z1=5.00 z2=--"));
        assert!(line.ends_with("-> estimate unstable"));

        record.rejection = None;
        record.triggered = true;
        assert!(record.to_string().ends_with("-> TRIGGER"));
    }
}
