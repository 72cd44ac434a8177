//! Error Types
//!
//! ## Design Philosophy
//!
//! Nothing in the control loop is allowed to fail. A missing echo becomes a
//! [`Sample::NoEcho`](crate::acquisition::Sample), a collapsed belief resets
//! itself, and a doubtful estimate closes the safety gate. The only place an
//! error can surface is at construction, when a configuration is
//! self-inconsistent. [`ConfigError`] covers exactly that.
//!
//! Like every error in the crate it is:
//!
//! 1. **Small**: `f32`/`usize` payloads and `&'static str` only
//! 2. **Heap-free**: usable on targets without an allocator
//! 3. **Copy**: returned by value without move complications
//!
//! The gate's refusal reasons are modelled separately as
//! [`Rejection`](crate::gate::Rejection); they are expected outcomes, not
//! failures.
//!
//! ## Handling
//!
//! ```rust
//! use rangeguard_core::config::SystemConfig;
//! use rangeguard_core::errors::ConfigError;
//!
//! let config = SystemConfig::default().with_safety_margin(40.0);
//! match config.validate() {
//!     Ok(()) => {}
//!     Err(ConfigError::InvalidSafetyMargin { .. }) => {
//!         // margin swallows the whole range - fix the constants
//!     }
//!     Err(_) => {}
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors - detected once, before the loop starts
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Distance window is empty, inverted or not finite
    #[error("Invalid distance window [{min}, {max}]")]
    InvalidRange {
        /// Configured minimum distance
        min: f32,
        /// Configured maximum distance
        max: f32,
    },

    /// Safety margin leaves no distance at which triggering is allowed
    #[error("Safety margin {margin} leaves no safe band in [{min}, {max}]")]
    InvalidSafetyMargin {
        /// Configured margin
        margin: f32,
        /// Minimum distance
        min: f32,
        /// Maximum distance
        max: f32,
    },

    /// Diffuse zone bounds are inverted or not finite
    #[error("Invalid diffuse zone ({start}, {end})")]
    InvalidDiffuseZone {
        /// Zone start
        start: f32,
        /// Zone end
        end: f32,
    },

    /// Histogram step is zero, negative or not finite
    #[error("Invalid histogram step {step}")]
    InvalidStep {
        /// Configured step
        step: f32,
    },

    /// Histogram grid does not fit the belief buffer
    #[error("Histogram needs {required} bins, capacity is {capacity}")]
    TooManyBins {
        /// Bins implied by range and step
        required: usize,
        /// Compile-time capacity
        capacity: usize,
    },

    /// Noise parameter bounds or factors are unusable
    #[error("Invalid noise model: {reason}")]
    InvalidNoiseModel {
        /// What is wrong
        reason: &'static str,
    },

    /// A strictly positive parameter is zero, negative or not finite
    #[error("Parameter {name} must be positive, got {value}")]
    NonPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// A value does not fit the quantized representation
    #[error("{name} = {value} does not fit the quantized range")]
    QuantizationOverflow {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidRange { min, max } =>
                defmt::write!(fmt, "Invalid range [{}, {}]", min, max),
            Self::InvalidSafetyMargin { margin, min, max } =>
                defmt::write!(fmt, "Margin {} leaves no band in [{}, {}]", margin, min, max),
            Self::InvalidDiffuseZone { start, end } =>
                defmt::write!(fmt, "Invalid diffuse zone ({}, {})", start, end),
            Self::InvalidStep { step } =>
                defmt::write!(fmt, "Invalid step {}", step),
            Self::TooManyBins { required, capacity } =>
                defmt::write!(fmt, "Need {} bins, capacity {}", required, capacity),
            Self::InvalidNoiseModel { reason } =>
                defmt::write!(fmt, "Noise model: {}", reason),
            Self::NonPositive { name, value } =>
                defmt::write!(fmt, "{} must be positive, got {}", name, value),
            Self::QuantizationOverflow { name, value } =>
                defmt::write!(fmt, "{} = {} overflows", name, value),
        }
    }
}

/// Ensure a parameter is finite and strictly positive
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check() {
        assert!(ensure_positive("q", 0.01).is_ok());
        assert_eq!(
            ensure_positive("q", 0.0),
            Err(ConfigError::NonPositive { name: "q", value: 0.0 })
        );
        assert!(ensure_positive("q", f32::NAN).is_err());
        assert!(ensure_positive("q", f32::INFINITY).is_err());
    }
}
