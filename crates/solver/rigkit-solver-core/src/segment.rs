//! Single-segment stretch and volume compensation (FK side).

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_finite_matrix, ensure_finite_vector, SolverResult};
use crate::math::{
    clamp_input, distance, floor_input, lerp, offset_position, position, reciprocal, safe_divide,
    Transform,
};
use crate::SolverConfig;

/// Length ratio of a segment, pulled toward 1 as `volumetric` drops to 0.
///
/// Shared by the FK segment and each half of the two-bone chain.
#[inline]
pub fn volumetric_ratio(length: f64, reference: f64, volumetric: f64) -> f64 {
    lerp(1.0, safe_divide(length, reference), volumetric)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentScaleInputs {
    /// Joint whose scale is driven
    pub driver_transform: Transform,
    /// Parent of the point the segment reaches towards
    pub parent_transform: Transform,
    /// Offset of that point in `parent_transform`'s space
    pub local_translation_offset: Vector3<f64>,
    /// Rest length of the segment
    pub reference_length: f64,
    /// 0 leaves the scale at 1, 1 applies the full length ratio
    pub volumetric: f64,
    /// Rig-wide scale folded into `reference_length`
    pub global_scale: f64,
}

impl Default for SegmentScaleInputs {
    fn default() -> Self {
        Self {
            driver_transform: Transform::identity(),
            parent_transform: Transform::identity(),
            local_translation_offset: Vector3::zeros(),
            reference_length: 1.0,
            volumetric: 1.0,
            global_scale: 1.0,
        }
    }
}

impl SegmentScaleInputs {
    fn ensure_finite(&self) -> SolverResult<()> {
        ensure_finite_matrix("driver_transform", &self.driver_transform)?;
        ensure_finite_matrix("parent_transform", &self.parent_transform)?;
        ensure_finite_vector("local_translation_offset", &self.local_translation_offset)?;
        ensure_finite("reference_length", self.reference_length)?;
        ensure_finite("volumetric", self.volumetric)?;
        ensure_finite("global_scale", self.global_scale)
    }
}

/// Both outputs are always produced; hosts wire whichever they need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentScaleOutputs {
    pub normalized_scale: f64,
    pub inverse_scale: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SegmentScaleSolver {
    config: SolverConfig,
}

impl SegmentScaleSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Validate `config`, then build the solver.
    pub fn try_new(config: SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(&self, inputs: &SegmentScaleInputs) -> SegmentScaleOutputs {
        let min = self.config.min_length;
        let reference = floor_input("reference_length", inputs.reference_length, min)
            * floor_input("global_scale", inputs.global_scale, min);
        let volumetric = clamp_input("volumetric", inputs.volumetric, 0.0, 1.0);

        let driver = position(&inputs.driver_transform);
        let target = offset_position(&inputs.parent_transform, &inputs.local_translation_offset);

        let ratio = volumetric_ratio(distance(&driver, &target), reference, volumetric);
        SegmentScaleOutputs {
            normalized_scale: ratio,
            inverse_scale: reciprocal(ratio),
        }
    }

    /// Reject non-finite inputs, then [`solve`](Self::solve).
    pub fn solve_checked(
        &self,
        inputs: &SegmentScaleInputs,
    ) -> SolverResult<SegmentScaleOutputs> {
        inputs.ensure_finite()?;
        Ok(self.solve(inputs))
    }
}
