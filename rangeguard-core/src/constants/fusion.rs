//! Fusion Algorithm Constants
//!
//! Parameters for the histogram (Bayesian) filter, the scalar Kalman filter
//! and the adaptive measurement-noise heuristic shared by both.

// ===== HISTOGRAM FILTER =====

/// Spacing between histogram bin centres (cm).
///
/// 0.1 cm over the 2–20 cm window gives 181 bins (~724 bytes of belief).
pub const HISTOGRAM_STEP_CM: f32 = 0.1;

/// Capacity of the belief vector.
///
/// Bounds RAM use; configurations needing more bins are rejected at
/// construction.
pub const MAX_HISTOGRAM_BINS: usize = 512;

/// Initial per-sensor standard deviation for the histogram likelihood (cm).
pub const HISTOGRAM_INITIAL_SIGMA_CM: f32 = 0.4;

/// Lower bound on histogram sigma (cm).
pub const HISTOGRAM_SIGMA_MIN_CM: f32 = 0.2;

/// Upper bound on histogram sigma (cm).
pub const HISTOGRAM_SIGMA_MAX_CM: f32 = 1.0;

/// Sigma growth factor when sensors disagree.
pub const HISTOGRAM_NOISE_GROWTH: f32 = 1.1;

/// Sigma shrink factor when sensors agree.
pub const HISTOGRAM_NOISE_SHRINK: f32 = 0.9;

// ===== KALMAN FILTER =====

/// Prior distance estimate (cm), roughly mid-window.
pub const KALMAN_INITIAL_ESTIMATE_CM: f32 = 10.0;

/// Prior variance (cm²).
pub const KALMAN_INITIAL_VARIANCE: f32 = 1.0;

/// Process noise added every predict step (cm²).
///
/// Small because the tracked target is assumed to be stationary between
/// 10 ms cycles.
pub const KALMAN_PROCESS_NOISE: f32 = 0.01;

/// Initial measurement noise for each sensor (cm²).
pub const KALMAN_INITIAL_R: f32 = 0.5;

/// Lower bound on measurement noise (cm²).
pub const KALMAN_R_MIN: f32 = 0.1;

/// Upper bound on measurement noise (cm²).
pub const KALMAN_R_MAX: f32 = 2.0;

/// Measurement noise growth factor when sensors disagree.
pub const KALMAN_NOISE_GROWTH: f32 = 1.05;

/// Measurement noise shrink factor when sensors agree.
pub const KALMAN_NOISE_SHRINK: f32 = 0.95;

// ===== ADAPTIVE NOISE =====

/// Absolute sensor difference (cm) above which the sensors disagree.
pub const DISAGREEMENT_THRESHOLD_CM: f32 = 1.0;

// ===== FIXED-POINT =====

/// Scaling factor of the quantized Kalman filter.
///
/// Every quantity is stored as `value × 100` in a `u16`, giving 0.01 cm
/// resolution up to 655.35 cm.
pub const QUANTIZED_SCALE: u32 = 100;
