//! Two-bone IK/FK chain lengths.
//!
//! [`ChainSolver::solve`] turns the current start/handle/pole placement and the artist
//! controls into the length each segment should have and the uniform scale that compensates
//! its volume. The pipeline runs in a fixed order:
//!
//! 1. effective rest lengths (reference × global scale × per-segment multiplier)
//! 2. soft IK, or hard stretch when softness is zero
//! 3. slide
//! 4. pole-vector lock
//! 5. volumetric compensation
//! 6. preferred angle, then the mirror sign
//!
//! Every stage is a plain function over [`SegmentPair`] so each can be exercised on its own.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_finite_matrix, ensure_finite_vector, SolverResult};
use crate::math::{
    clamp_input, distance, floor_input, lerp, offset_position, position, reciprocal, safe_divide,
    sign_of, Transform,
};
use crate::preferred_angle::preferred_angle_output;
use crate::segment::volumetric_ratio;
use crate::SolverConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainInputs {
    pub start_transform: Transform,
    pub handle_parent_transform: Transform,
    /// Handle offset in `handle_parent_transform`'s space
    pub handle_local_translation: Vector3<f64>,
    pub pole_transform: Transform,
    pub start_reference_length: f64,
    pub end_reference_length: f64,
    pub start_scale_multiplier: f64,
    pub end_scale_multiplier: f64,
    pub global_scale: f64,
    /// Mirror sign; only the sign is used
    pub direction_sign: f64,
    /// -1 shortens the start segment completely, 1 the end segment
    pub slide: f64,
    pub stretch: f64,
    pub softness: f64,
    pub volumetric: f64,
    pub pole_vector_lock: f64,
    /// Degrees per axis
    pub preferred_angle_input: Vector3<f64>,
    pub preferred_angle_blend: f64,
}

impl Default for ChainInputs {
    fn default() -> Self {
        Self {
            start_transform: Transform::identity(),
            handle_parent_transform: Transform::identity(),
            handle_local_translation: Vector3::zeros(),
            pole_transform: Transform::identity(),
            start_reference_length: 1.0,
            end_reference_length: 1.0,
            start_scale_multiplier: 1.0,
            end_scale_multiplier: 1.0,
            global_scale: 1.0,
            direction_sign: 1.0,
            slide: 0.0,
            stretch: 0.0,
            softness: 0.0,
            volumetric: 0.0,
            pole_vector_lock: 0.0,
            preferred_angle_input: Vector3::zeros(),
            preferred_angle_blend: 7.0,
        }
    }
}

impl ChainInputs {
    /// Place the handle at a world position (identity parent, offset = `position`).
    pub fn with_handle_at(mut self, position: Vector3<f64>) -> Self {
        self.handle_parent_transform = Transform::identity();
        self.handle_local_translation = position;
        self
    }

    /// Place the pole at a world position.
    pub fn with_pole_at(mut self, position: Vector3<f64>) -> Self {
        self.pole_transform = Transform::new_translation(&position);
        self
    }

    pub fn with_reference_lengths(mut self, start: f64, end: f64) -> Self {
        self.start_reference_length = start;
        self.end_reference_length = end;
        self
    }

    fn ensure_finite(&self) -> SolverResult<()> {
        ensure_finite_matrix("start_transform", &self.start_transform)?;
        ensure_finite_matrix("handle_parent_transform", &self.handle_parent_transform)?;
        ensure_finite_vector("handle_local_translation", &self.handle_local_translation)?;
        ensure_finite_matrix("pole_transform", &self.pole_transform)?;
        ensure_finite("start_reference_length", self.start_reference_length)?;
        ensure_finite("end_reference_length", self.end_reference_length)?;
        ensure_finite("start_scale_multiplier", self.start_scale_multiplier)?;
        ensure_finite("end_scale_multiplier", self.end_scale_multiplier)?;
        ensure_finite("global_scale", self.global_scale)?;
        ensure_finite("direction_sign", self.direction_sign)?;
        ensure_finite("slide", self.slide)?;
        ensure_finite("stretch", self.stretch)?;
        ensure_finite("softness", self.softness)?;
        ensure_finite("volumetric", self.volumetric)?;
        ensure_finite("pole_vector_lock", self.pole_vector_lock)?;
        ensure_finite_vector("preferred_angle_input", &self.preferred_angle_input)?;
        ensure_finite("preferred_angle_blend", self.preferred_angle_blend)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainOutputs {
    pub start_output_length: f64,
    pub end_output_length: f64,
    pub start_output_scale: f64,
    pub end_output_scale: f64,
    /// Degrees; exactly one axis is non-zero
    pub preferred_angle_output: Vector3<f64>,
}

/// Lengths of the start and end segment at some stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPair {
    pub start: f64,
    pub end: f64,
}

impl SegmentPair {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn total(&self) -> f64 {
        self.start + self.end
    }

    fn scaled(self, factor: f64) -> Self {
        Self::new(self.start * factor, self.end * factor)
    }

    fn lerp_to(self, other: Self, t: f64) -> Self {
        Self::new(lerp(self.start, other.start, t), lerp(self.end, other.end, t))
    }
}

/// Factor soft IK applies to both segments. Exactly 1 up to `chain_len - softness`.
///
/// Softness larger than the chain pushes the soft distance below zero; the falloff still
/// applies there, except where the softened distance itself is not positive (scale 1).
pub fn soft_ik_scale(current_len: f64, chain_len: f64, softness: f64) -> f64 {
    let soft_distance = chain_len - softness;
    if softness == 0.0 || current_len <= soft_distance {
        return 1.0;
    }
    let new_distance =
        soft_distance + softness * (1.0 - (-(current_len - soft_distance)).exp());
    if new_distance <= 0.0 {
        return 1.0;
    }
    safe_divide(current_len, new_distance)
}

/// Soft IK, or hard stretch when `softness` is zero. Both blend from `initial` by `stretch`.
pub fn apply_stretch(
    initial: SegmentPair,
    current_len: f64,
    softness: f64,
    stretch: f64,
) -> SegmentPair {
    let chain_len = initial.total();
    if softness != 0.0 {
        let scale = soft_ik_scale(current_len, chain_len, softness);
        if scale == 1.0 {
            return initial;
        }
        return initial.lerp_to(initial.scaled(scale), stretch);
    }

    if stretch != 0.0 {
        let delta = current_len / chain_len;
        if delta > 1.0 {
            return initial.lerp_to(initial.scaled(delta), stretch);
        }
    }
    initial
}

/// Move length between the segments without changing their sum.
///
/// `slide` is expected in `[-1, 1]`; its magnitude stays `epsilon` short of 1 so the shrinking
/// segment never reaches zero.
pub fn apply_slide(lengths: SegmentPair, slide: f64, epsilon: f64) -> SegmentPair {
    let total = lengths.total();
    let alpha = slide.abs().min(1.0 - epsilon);
    if slide >= 0.0 {
        SegmentPair::new(
            lerp(lengths.start, total, alpha),
            lerp(lengths.end, 0.0, alpha),
        )
    } else {
        SegmentPair::new(
            lerp(lengths.start, 0.0, alpha),
            lerp(lengths.end, total, alpha),
        )
    }
}

/// Blend toward the literal start→pole and pole→handle distances.
pub fn apply_pole_lock(
    lengths: SegmentPair,
    start: &Vector3<f64>,
    pole: &Vector3<f64>,
    handle: &Vector3<f64>,
    lock: f64,
) -> SegmentPair {
    lengths.lerp_to(
        SegmentPair::new(distance(start, pole), distance(pole, handle)),
        lock,
    )
}

/// Volumetric compensation. Returns the compensated lengths and each segment's scale.
///
/// The end segment also picks up the start segment's ratio so that squash travels down the
/// chain.
pub fn apply_volumetric(
    lengths: SegmentPair,
    initial: SegmentPair,
    volumetric: f64,
) -> (SegmentPair, SegmentPair) {
    let start_ratio = volumetric_ratio(lengths.start, initial.start, volumetric);
    let end_ratio = volumetric_ratio(lengths.end, initial.end, volumetric);
    let compensated = SegmentPair::new(
        lengths.start * start_ratio,
        lengths.end * end_ratio * start_ratio,
    );
    let scales = SegmentPair::new(reciprocal(start_ratio), reciprocal(end_ratio));
    (compensated, scales)
}

/// Stateless two-bone chain solver.
#[derive(Debug, Clone, Default)]
pub struct ChainSolver {
    config: SolverConfig,
}

impl ChainSolver {
    /// Solver over `config` as given. Malformed thresholds never panic, but only a config
    /// that passes [`SolverConfig::validate`] gives meaningful output. See
    /// [`try_new`](Self::try_new).
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

    /// Rest lengths after global and per-segment scaling, floored away from zero.
    pub fn initial_lengths(&self, inputs: &ChainInputs) -> SegmentPair {
        let min = self.config.min_length;
        let global = floor_input("global_scale", inputs.global_scale, min);
        SegmentPair::new(
            floor_input("start_reference_length", inputs.start_reference_length, min)
                * global
                * floor_input("start_scale_multiplier", inputs.start_scale_multiplier, min),
            floor_input("end_reference_length", inputs.end_reference_length, min)
                * global
                * floor_input("end_scale_multiplier", inputs.end_scale_multiplier, min),
        )
    }

    pub fn solve(&self, inputs: &ChainInputs) -> ChainOutputs {
        let cfg = &self.config;

        let initial = self.initial_lengths(inputs);
        let chain_len = initial.total();

        let start_pos = position(&inputs.start_transform);
        let handle_pos = offset_position(
            &inputs.handle_parent_transform,
            &inputs.handle_local_translation,
        );
        let current_len = distance(&start_pos, &handle_pos);

        let softness = clamp_input("softness", inputs.softness, 0.0, f64::INFINITY);
        let stretch = clamp_input("stretch", inputs.stretch, 0.0, 1.0);
        let slide = clamp_input("slide", inputs.slide, -1.0, 1.0);
        let lock = clamp_input("pole_vector_lock", inputs.pole_vector_lock, 0.0, 1.0);
        let volumetric = clamp_input("volumetric", inputs.volumetric, 0.0, 1.0);

        let mut lengths = apply_stretch(initial, current_len, softness, stretch);
        lengths = apply_slide(lengths, slide, cfg.slide_epsilon);

        if lock > cfg.pole_lock_threshold {
            let pole_pos = position(&inputs.pole_transform);
            lengths = apply_pole_lock(lengths, &start_pos, &pole_pos, &handle_pos, lock);
        }

        let (lengths, scales) = apply_volumetric(lengths, initial, volumetric);

        let preferred = preferred_angle_output(
            &inputs.preferred_angle_input,
            safe_divide(current_len, chain_len),
            inputs.preferred_angle_blend,
            cfg,
        );

        let direction = sign_of(inputs.direction_sign);
        ChainOutputs {
            start_output_length: lengths.start * direction,
            end_output_length: lengths.end * direction,
            start_output_scale: scales.start,
            end_output_scale: scales.end,
            preferred_angle_output: preferred,
        }
    }

    /// Reject non-finite inputs, then [`solve`](Self::solve).
    pub fn solve_checked(&self, inputs: &ChainInputs) -> SolverResult<ChainOutputs> {
        inputs.ensure_finite()?;
        Ok(self.solve(inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn straight_chain(start: f64, end: f64, reach: f64) -> ChainInputs {
        ChainInputs::default()
            .with_reference_lengths(start, end)
            .with_handle_at(Vector3::new(reach, 0.0, 0.0))
    }

    #[test]
    fn initial_lengths_combine_scales() {
        let inputs = ChainInputs {
            start_reference_length: 2.0,
            end_reference_length: 3.0,
            global_scale: 2.0,
            start_scale_multiplier: 1.5,
            end_scale_multiplier: 0.5,
            ..Default::default()
        };
        let initial = ChainSolver::default().initial_lengths(&inputs);
        assert_relative_eq!(initial.start, 6.0);
        assert_relative_eq!(initial.end, 3.0);
    }

    #[test]
    fn non_positive_reference_is_floored() {
        let inputs = straight_chain(0.0, -4.0, 1.0);
        let initial = ChainSolver::default().initial_lengths(&inputs);
        assert_eq!(initial, SegmentPair::new(1.0e-3, 1.0e-3));

        let out = ChainSolver::default().solve(&ChainInputs {
            volumetric: 1.0,
            stretch: 1.0,
            ..inputs
        });
        assert!(out.start_output_length.is_finite());
        assert!(out.end_output_scale.is_finite());
        assert!(out.preferred_angle_output.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn soft_ik_scale_is_one_at_boundary() {
        let chain_len = 10.0;
        let softness = 1.5;
        let boundary = chain_len - softness;
        assert_eq!(soft_ik_scale(boundary, chain_len, softness), 1.0);
        assert_abs_diff_eq!(
            soft_ik_scale(boundary + 1.0e-9, chain_len, softness),
            1.0,
            epsilon = 1.0e-8
        );
    }

    #[test]
    fn soft_ik_scale_grows_past_boundary() {
        let mut last = 1.0;
        for step in 1..50 {
            let current = 8.5 + step as f64 * 0.1;
            let scale = soft_ik_scale(current, 10.0, 1.5);
            assert!(scale >= last, "scale dipped at {current}");
            last = scale;
        }
        assert!(last > 1.0);
    }

    #[test]
    fn soft_ik_needs_stretch_to_lengthen() {
        let initial = SegmentPair::new(5.0, 5.0);
        assert_eq!(apply_stretch(initial, 10.0, 1.0, 0.0), initial);

        let stretched = apply_stretch(initial, 10.0, 1.0, 1.0);
        let scale = soft_ik_scale(10.0, 10.0, 1.0);
        assert!(scale > 1.0);
        assert_relative_eq!(stretched.start, 5.0 * scale);
        assert_relative_eq!(stretched.end, 5.0 * scale);
    }

    #[test]
    fn hard_stretch_only_lengthens() {
        let initial = SegmentPair::new(5.0, 5.0);
        assert_eq!(apply_stretch(initial, 8.0, 0.0, 1.0), initial);
        let half = apply_stretch(initial, 12.0, 0.0, 0.5);
        assert_relative_eq!(half.start, 5.5);
        assert_relative_eq!(half.end, 5.5);
    }

    #[test]
    fn slide_conserves_total() {
        let lengths = SegmentPair::new(3.0, 7.0);
        for step in -10..=10 {
            let slide = step as f64 / 10.0;
            let out = apply_slide(lengths, slide, 1.0e-3);
            assert_relative_eq!(out.total(), 10.0, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn full_slide_keeps_segment_alive() {
        let lengths = SegmentPair::new(5.0, 5.0);
        let forward = apply_slide(lengths, 1.0, 1.0e-3);
        assert!(forward.end > 0.0);
        assert_abs_diff_eq!(forward.end, 5.0e-3, epsilon = 1.0e-12);

        let backward = apply_slide(lengths, -1.0, 1.0e-3);
        assert!(backward.start > 0.0);
        assert_abs_diff_eq!(backward.end, 10.0 - 5.0e-3, epsilon = 1.0e-12);
    }

    #[test]
    fn pole_lock_blends_to_pole_distances() {
        let lengths = SegmentPair::new(5.0, 5.0);
        let start = Vector3::zeros();
        let pole = Vector3::new(3.0, 4.0, 0.0);
        let handle = Vector3::new(6.0, 0.0, 0.0);
        let full = apply_pole_lock(lengths, &start, &pole, &handle, 1.0);
        assert_relative_eq!(full.start, 5.0);
        assert_relative_eq!(full.end, 5.0);

        let pole = Vector3::new(0.0, 2.0, 0.0);
        let half = apply_pole_lock(lengths, &start, &pole, &handle, 0.5);
        assert_relative_eq!(half.start, 3.5);
        assert_relative_eq!(half.end, 0.5 * 5.0 + 0.5 * 40.0_f64.sqrt());
    }

    #[test]
    fn volumetric_zero_is_identity() {
        let initial = SegmentPair::new(5.0, 5.0);
        let (lengths, scales) = apply_volumetric(SegmentPair::new(7.0, 3.0), initial, 0.0);
        assert_eq!(lengths, SegmentPair::new(7.0, 3.0));
        assert_eq!(scales, SegmentPair::new(1.0, 1.0));
    }

    #[test]
    fn volumetric_end_segment_compounds_ratios() {
        let initial = SegmentPair::new(5.0, 5.0);
        let (lengths, scales) = apply_volumetric(SegmentPair::new(6.0, 4.0), initial, 1.0);
        assert_relative_eq!(scales.start, 5.0 / 6.0, epsilon = 1.0e-12);
        assert_relative_eq!(scales.end, 5.0 / 4.0, epsilon = 1.0e-12);
        assert_relative_eq!(lengths.start, 7.2, epsilon = 1.0e-12);
        assert_relative_eq!(lengths.end, 3.84, epsilon = 1.0e-12);
    }

    #[test]
    fn direction_mirrors_lengths_only() {
        let solver = ChainSolver::default();
        let base = straight_chain(5.0, 5.0, 12.0);
        let stretched = ChainInputs {
            stretch: 1.0,
            volumetric: 1.0,
            ..base
        };
        let forward = solver.solve(&stretched);
        let mirrored = solver.solve(&ChainInputs {
            direction_sign: -1.0,
            ..stretched.clone()
        });
        assert_relative_eq!(mirrored.start_output_length, -forward.start_output_length);
        assert_relative_eq!(mirrored.end_output_length, -forward.end_output_length);
        assert_eq!(mirrored.start_output_scale, forward.start_output_scale);
        assert_eq!(mirrored.preferred_angle_output, forward.preferred_angle_output);
    }

    #[test]
    fn out_of_range_controls_are_clamped() {
        let solver = ChainSolver::default();
        let sane = solver.solve(&ChainInputs {
            stretch: 1.0,
            slide: 1.0,
            ..straight_chain(5.0, 5.0, 12.0)
        });
        let wild = solver.solve(&ChainInputs {
            stretch: 4.0,
            slide: 9.0,
            softness: -2.0,
            ..straight_chain(5.0, 5.0, 12.0)
        });
        assert_eq!(sane, wild);
    }

    #[test]
    fn oversized_softness_stays_finite() {
        let solver = ChainSolver::default();
        for reach in [0.0, 1.0e-6, 0.5, 2.0, 50.0] {
            let out = solver.solve(&ChainInputs {
                softness: 100.0,
                stretch: 1.0,
                volumetric: 1.0,
                ..straight_chain(1.0, 1.0, reach)
            });
            assert!(out.start_output_length.is_finite(), "reach {reach}");
            assert!(out.end_output_length.is_finite(), "reach {reach}");
            assert!(out.start_output_scale.is_finite(), "reach {reach}");
        }
    }

    #[test]
    fn softness_beyond_chain_keeps_full_falloff() {
        // chain 2, softness 3: soft distance -1, softened distance -1 + 3 * (1 - e^-2.9)
        let out = ChainSolver::default().solve(&ChainInputs {
            softness: 3.0,
            stretch: 1.0,
            ..straight_chain(1.0, 1.0, 1.9)
        });
        let softened = -1.0 + 3.0 * (1.0 - (-2.9_f64).exp());
        assert_relative_eq!(out.start_output_length, 1.9 / softened, epsilon = 1.0e-12);
        assert_relative_eq!(out.start_output_length, 1.035_461_651_462_596, epsilon = 1.0e-9);
        assert_relative_eq!(out.end_output_length, out.start_output_length);
    }

    #[test]
    fn non_positive_softened_distance_leaves_lengths() {
        // chain 0.5, softness 0.6: the softened distance at 0.01 is about -0.0375
        assert_eq!(soft_ik_scale(0.01, 0.5, 0.6), 1.0);
        assert!(soft_ik_scale(0.4, 0.5, 0.6) > 0.0);
    }

    #[test]
    fn nan_scalars_never_panic() {
        let solver = ChainSolver::default();
        let fields: [fn(&mut ChainInputs); 13] = [
            |i| i.start_reference_length = f64::NAN,
            |i| i.end_reference_length = f64::NAN,
            |i| i.start_scale_multiplier = f64::NAN,
            |i| i.end_scale_multiplier = f64::NAN,
            |i| i.global_scale = f64::NAN,
            |i| i.direction_sign = f64::NAN,
            |i| i.slide = f64::NAN,
            |i| i.stretch = f64::NAN,
            |i| i.softness = f64::NAN,
            |i| i.volumetric = f64::NAN,
            |i| i.pole_vector_lock = f64::NAN,
            |i| i.preferred_angle_blend = f64::NAN,
            |i| i.preferred_angle_input = Vector3::new(f64::NAN, 0.0, 0.0),
        ];
        for (n, poison) in fields.iter().enumerate() {
            let mut inputs = ChainInputs {
                softness: 1.0,
                stretch: 1.0,
                volumetric: 1.0,
                ..straight_chain(5.0, 5.0, 12.0)
            };
            poison(&mut inputs);
            let out = solver.solve(&inputs);
            assert!(out.start_output_scale.is_finite(), "field #{n}");
        }

        // a NaN rest length is floored like any other degenerate length
        let out = solver.solve(&ChainInputs {
            global_scale: f64::NAN,
            ..straight_chain(5.0, 5.0, 1.0e-3)
        });
        assert!(out.start_output_length.is_finite());
    }

    #[test]
    fn unvalidated_config_does_not_panic() {
        let inverted = SolverConfig::default().with_preferred_angle_range(45.0, 10.0);
        assert!(ChainSolver::try_new(inverted.clone()).is_err());
        assert!(ChainSolver::try_new(SolverConfig::default()).is_ok());

        let out = ChainSolver::new(inverted).solve(&ChainInputs {
            preferred_angle_input: Vector3::new(0.0, 30.0, 0.0),
            ..Default::default()
        });
        assert!(out.preferred_angle_output.y.is_finite());

        let nan_bounds = SolverConfig::default().with_preferred_angle_range(f64::NAN, f64::NAN);
        let out = ChainSolver::new(nan_bounds).solve(&ChainInputs::default());
        assert_eq!(out.start_output_length, 1.0);
    }

    #[test]
    fn checked_solve_names_the_bad_field() {
        let solver = ChainSolver::default();
        let mut inputs = straight_chain(5.0, 5.0, 10.0);
        inputs.pole_transform[(1, 3)] = f64::INFINITY;
        let err = solver.solve_checked(&inputs).unwrap_err();
        assert_eq!(
            err,
            crate::SolverError::NonFinite {
                field: "pole_transform"
            }
        );

        inputs.pole_transform = Transform::identity();
        inputs.softness = f64::NAN;
        assert!(solver.solve_checked(&inputs).is_err());

        inputs.softness = 0.0;
        assert!(solver.solve_checked(&inputs).is_ok());
    }
}
