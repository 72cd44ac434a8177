//! Core Traits and Abstractions for RangeGuard
//!
//! The traits here are the seams between the algorithmic core and
//! everything it does not own.
//!
//! ## Module Organization
//!
//! - [`hardware`] - Echo sensor and output line boundaries
//! - [`fusion`] - Interchangeable range estimator contract
//!
//! The clock boundary is [`TimeSource`](crate::time::TimeSource).
//!
//! ## Design Philosophy
//!
//! Hardware is reached only through these traits, so every component can
//! be driven from a test with scripted echoes and a fake clock. All
//! dispatch is static; a controller is monomorphized over its estimator
//! and drivers.

pub mod fusion;
pub mod hardware;

pub use fusion::RangeEstimator;
pub use hardware::{EchoSensor, OutputLine};
