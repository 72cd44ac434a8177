//! Ranging Constants
//!
//! Echo timing and distance window for HC-SR04 class ultrasonic sensors
//! mounted on the reference 20 cm rig.

// ===== ECHO TIMING =====

/// Maximum time to wait for the echo pulse (microseconds).
///
/// 25 ms of round trip corresponds to roughly 4.3 m, the theoretical
/// maximum of the HC-SR04. Anything longer is treated as "no echo".
///
/// Source: HC-SR04 datasheet
pub const ECHO_TIMEOUT_US: u32 = 25_000;

/// Speed of sound in air (cm per microsecond) at ~20°C.
///
/// The echo covers the distance twice, so distance = `t × 0.0343 / 2`.
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Round-trip microseconds per centimetre for integer-only conversion.
///
/// `1 / (0.0343 / 2) ≈ 58.3`; the integer divisor truncates to whole
/// centimetres.
pub const ECHO_US_PER_CM: u32 = 58;

// ===== DISTANCE WINDOW =====

/// Minimum useful distance (cm). Closer readings are clamped up to this.
pub const MIN_DIST_CM: f32 = 2.0;

/// Maximum technically reliable distance (cm) on the reference rig.
pub const MAX_DIST_CM: f32 = 20.0;

// ===== DIFFUSE ZONE =====

/// Start of the diffuse zone (cm, exclusive).
///
/// Between start and end the sensor's echo response is physically
/// ambiguous. Readings there are reclassified as out of range.
pub const DIFFUSE_ZONE_START_CM: f32 = 19.0;

/// End of the diffuse zone (cm, exclusive).
pub const DIFFUSE_ZONE_END_CM: f32 = 22.0;

// ===== SHORT RANGE RIG =====

/// Maximum distance for the 15 cm rig (cm).
pub const SHORT_RANGE_MAX_DIST_CM: f32 = 15.0;

/// Diffuse zone start for the 15 cm rig (cm).
pub const SHORT_RANGE_DIFFUSE_START_CM: f32 = 14.6;

/// Diffuse zone end for the 15 cm rig (cm).
pub const SHORT_RANGE_DIFFUSE_END_CM: f32 = 17.0;
