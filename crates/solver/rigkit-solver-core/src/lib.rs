//! rigkit-solver-core: stateless two-bone IK/FK chain and segment scale solvers.
//!
//! Both solvers are pure functions of their inputs and an immutable [`SolverConfig`]. `solve`
//! never fails: out-of-range controls are clamped and degenerate lengths are floored. Use
//! `solve_checked` at a host boundary to reject NaN and infinities instead.

pub mod chain;
pub mod config;
pub mod error;
pub mod math;
pub mod preferred_angle;
pub mod segment;

pub use chain::{
    apply_pole_lock, apply_slide, apply_stretch, apply_volumetric, soft_ik_scale, ChainInputs,
    ChainOutputs, ChainSolver, SegmentPair,
};
pub use config::SolverConfig;
pub use error::{SolverError, SolverResult};
pub use math::{transform_from_row_major, Transform, SMALL_NUMBER};
pub use preferred_angle::{dominant_axis, preferred_angle, preferred_angle_output, Axis};
pub use segment::{volumetric_ratio, SegmentScaleInputs, SegmentScaleOutputs, SegmentScaleSolver};
