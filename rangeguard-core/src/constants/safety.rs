//! Safety Gate Constants

/// Margin subtracted from the maximum distance to get the highest distance
/// at which triggering is allowed (cm).
///
/// `MAX_DIST_CM - SAFETY_MARGIN_CM = 18 cm` on the reference rig, safely
/// below the 19 cm diffuse zone.
pub const SAFETY_MARGIN_CM: f32 = 2.0;

/// Safety margin for the 15 cm rig (cm), giving a 14.4 cm limit.
pub const SHORT_RANGE_SAFETY_MARGIN_CM: f32 = 0.6;

/// Maximum spread of recent estimates still considered stable (cm).
pub const STABILITY_THRESHOLD_CM: f32 = 0.2;

/// Maximum estimator uncertainty at which triggering is allowed.
///
/// Compared against the Kalman variance, or the belief variance for the
/// histogram filter (cm²).
pub const CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Number of recent estimates kept by the stability tracker.
pub const HISTORY_SIZE: usize = 5;
