//! Adaptive measurement noise
//!
//! A heuristic, not a statistical estimator. The two sensors watch the same
//! target, so their disagreement is a cheap proxy for how noisy they
//! currently are:
//!
//! ```text
//! |z1 - z2| > threshold  → noise × growth   (toward max)
//! otherwise              → noise × shrink   (toward min)
//! ```
//!
//! Both sensors always share the same adjustment. The bounds keep the
//! filter from either ignoring measurements entirely or trusting them
//! blindly. Whether a cycle with a missing sensor counts as "otherwise" is
//! selected by [`DropoutPolicy`].

use crate::config::{DropoutPolicy, NoiseConfig};

/// Direction of the last adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseAdjustment {
    /// Sensors disagreed
    Grew,
    /// Sensors agreed (or a dropout under [`DropoutPolicy::Shrink`])
    Shrank,
    /// Dropout under [`DropoutPolicy::Hold`]
    Held,
}

/// Per-sensor noise parameters with their adaptation rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseModel {
    values: [f32; 2],
    config: NoiseConfig,
}

impl NoiseModel {
    /// Start both sensors at `config.initial`
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            values: [config.initial; 2],
            config,
        }
    }

    /// Adjust from one cycle's distances
    pub fn adapt(&mut self, z1: Option<f32>, z2: Option<f32>) -> NoiseAdjustment {
        let adjustment = match (z1, z2) {
            (Some(a), Some(b)) if libm::fabsf(a - b) > self.config.disagreement_threshold => {
                NoiseAdjustment::Grew
            }
            (Some(_), Some(_)) => NoiseAdjustment::Shrank,
            _ => match self.config.dropout {
                DropoutPolicy::Shrink => NoiseAdjustment::Shrank,
                DropoutPolicy::Hold => NoiseAdjustment::Held,
            },
        };

        let factor = match adjustment {
            NoiseAdjustment::Grew => self.config.growth,
            NoiseAdjustment::Shrank => self.config.shrink,
            NoiseAdjustment::Held => return adjustment,
        };

        for value in self.values.iter_mut() {
            *value = (*value * factor).max(self.config.min).min(self.config.max);
        }

        adjustment
    }

    /// Noise for sensor `index` (0 or 1)
    pub fn get(&self, index: usize) -> f32 {
        self.values[index & 1]
    }

    /// Both noise values
    pub fn values(&self) -> [f32; 2] {
        self.values
    }

    /// Configuration in use
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Back to the initial value
    pub fn reset(&mut self) {
        self.values = [self.config.initial; 2];
    }
}
