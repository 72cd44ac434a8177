//! Timing Constants
//!
//! Control loop cadence and actuator dwell times.

/// Interval between measurement cycles (milliseconds).
///
/// Two sequential pings can take up to 50 ms when both sensors time out,
/// so in that case the loop simply runs back to back.
pub const READ_INTERVAL_MS: u32 = 10;

/// How long the output stays high once triggered (milliseconds).
pub const ON_DURATION_MS: u32 = 5000;

/// Cool-down after the output goes low before re-arming (milliseconds).
pub const OFF_DURATION_MS: u32 = 1000;
