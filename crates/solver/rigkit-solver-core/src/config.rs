//! Tunable thresholds for the solvers.

use crate::SolverError;
use serde::{Deserialize, Serialize};

/// Thresholds shared by [`ChainSolver`](crate::ChainSolver) and
/// [`SegmentScaleSolver`](crate::SegmentScaleSolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Floor applied to reference lengths and scale multipliers
    pub min_length: f64,
    /// How far a full slide stays away from collapsing a segment
    pub slide_epsilon: f64,
    /// Pole-vector lock values at or below this are ignored
    pub pole_lock_threshold: f64,
    /// Lower clamp of the preferred angle, in degrees
    pub preferred_angle_min: f64,
    /// Upper clamp of the preferred angle, in degrees
    pub preferred_angle_max: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_length: 1.0e-3,
            slide_epsilon: 1.0e-3,
            pole_lock_threshold: 1.0e-3,
            preferred_angle_min: 1.0,
            preferred_angle_max: 90.0,
        }
    }
}

impl SolverConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SolverError> {
        let fields = [
            ("min_length", self.min_length),
            ("slide_epsilon", self.slide_epsilon),
            ("pole_lock_threshold", self.pole_lock_threshold),
            ("preferred_angle_min", self.preferred_angle_min),
            ("preferred_angle_max", self.preferred_angle_max),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(SolverError::InvalidConfig {
                    reason: format!("{name} must be positive and finite, got {value}"),
                });
            }
        }

        if self.slide_epsilon >= 1.0 {
            return Err(SolverError::InvalidConfig {
                reason: "slide_epsilon must be below 1".to_string(),
            });
        }

        if self.preferred_angle_min > self.preferred_angle_max {
            return Err(SolverError::InvalidConfig {
                reason: format!(
                    "preferred angle range [{}, {}] is empty",
                    self.preferred_angle_min, self.preferred_angle_max
                ),
            });
        }

        Ok(())
    }

    #[inline]
    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length;
        self
    }

    #[inline]
    pub fn with_slide_epsilon(mut self, epsilon: f64) -> Self {
        self.slide_epsilon = epsilon;
        self
    }

    #[inline]
    pub fn with_pole_lock_threshold(mut self, threshold: f64) -> Self {
        self.pole_lock_threshold = threshold;
        self
    }

    /// Set the preferred angle clamp range, in degrees
    #[inline]
    pub fn with_preferred_angle_range(mut self, min: f64, max: f64) -> Self {
        self.preferred_angle_min = min;
        self.preferred_angle_max = max;
        self
    }
}
