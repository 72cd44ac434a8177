//! Dual ultrasonic range fusion with safety-gated actuation
//!
//! Two noisy HC-SR04 class sensors watch the same target. This crate turns
//! their echoes into one distance estimate with an uncertainty, and fires a
//! single output only when that estimate is in range, has been steady, is
//! confident, and is confirmed by at least one raw reading.
//!
//! Key constraints:
//! - Runs on small microcontrollers without an allocator
//! - No heap allocation anywhere, belief capacity fixed at compile time
//! - Nothing in the loop can fail; every anomaly degrades to "do not fire"
//!
//! ```rust
//! use rangeguard_core::{SystemConfig, QuantizedKalman, RangeEstimator};
//!
//! let config = SystemConfig::default();
//! let mut filter = QuantizedKalman::new(config.limits, config.kalman)?;
//!
//! for _ in 0..40 {
//!     filter.update(Some(6.0), Some(6.0));
//! }
//! assert!((filter.current().distance - 6.0).abs() < 0.1);
//! # Ok::<(), rangeguard_core::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod acquisition;
pub mod actuation;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod events;
pub mod fusion;
pub mod gate;
pub mod time;
pub mod traits;

// Public API
pub use acquisition::{RangeFinder, Sample};
pub use actuation::{Actuator, ActuatorPhase, ActuatorState, Transition};
pub use buffer::EstimateHistory;
pub use config::{SensorSanity, SystemConfig};
pub use controller::{Controller, FusionCore, PollOutput};
pub use errors::{ConfigError, ConfigResult};
pub use events::CycleRecord;
pub use fusion::{Estimate, FusionOutcome, HistogramFilter, KalmanFilter, QuantizedKalman};
pub use gate::{Rejection, SafetyGate};
pub use time::{Millis, TimeSource};
pub use traits::{EchoSensor, OutputLine, RangeEstimator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
