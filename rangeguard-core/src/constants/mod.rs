//! Constants for RangeGuard Core
//!
//! This module provides centralized, documented reference values used
//! throughout the crate. The [`config`](crate::config) module builds its
//! defaults from these; nothing else should hard-code a distance, factor or
//! duration.
//!
//! ## Organization
//!
//! Constants are grouped by concern:
//! - **Ranging**: Echo timing, speed of sound, distance window, diffuse zone
//! - **Fusion**: Histogram grid, Kalman prior, adaptive noise bounds
//! - **Safety**: Margin and gate thresholds
//! - **Timing**: Control loop and actuator dwell times
//!
//! ## Units
//!
//! - Distances are centimetres (`f32`)
//! - Kalman variances are cm² (`f32`)
//! - Loop and dwell times are milliseconds, echo times are microseconds

/// Echo timing, distance window and diffuse zone for HC-SR04 class sensors.
pub mod ranging;

/// Histogram filter, Kalman filter and adaptive noise parameters.
pub mod fusion;

/// Safety margin and gate thresholds.
pub mod safety;

/// Control loop and actuator timing.
pub mod timing;

pub use ranging::{
    MIN_DIST_CM, MAX_DIST_CM, DIFFUSE_ZONE_START_CM, DIFFUSE_ZONE_END_CM,
    ECHO_TIMEOUT_US, SPEED_OF_SOUND_CM_PER_US, ECHO_US_PER_CM,
};

pub use fusion::{
    HISTOGRAM_STEP_CM, MAX_HISTOGRAM_BINS, KALMAN_INITIAL_ESTIMATE_CM,
    KALMAN_INITIAL_VARIANCE, KALMAN_PROCESS_NOISE, KALMAN_INITIAL_R,
    QUANTIZED_SCALE,
};

pub use safety::{
    SAFETY_MARGIN_CM, STABILITY_THRESHOLD_CM, CONFIDENCE_THRESHOLD,
    HISTORY_SIZE,
};

pub use timing::{
    READ_INTERVAL_MS, ON_DURATION_MS, OFF_DURATION_MS,
};
