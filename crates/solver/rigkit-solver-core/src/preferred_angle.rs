//! Preferred-angle bias for the downstream bend solver.
//!
//! When a two-bone chain is fully extended the bend direction is undefined. The bias grows as
//! the chain straightens so the bend solver always has a stable default to start from.
//! Angles are in degrees.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::sign_of;
use crate::SolverConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis of `angles` with the largest magnitude. Ties go to the earlier axis (x, then y).
pub fn dominant_axis(angles: &Vector3<f64>) -> Axis {
    let (x, y, z) = (angles.x.abs(), angles.y.abs(), angles.z.abs());
    if x >= y && x >= z {
        Axis::X
    } else if y >= z {
        Axis::Y
    } else {
        Axis::Z
    }
}

/// Bias for a single axis.
///
/// `normalized_chain_length` is the current handle distance over the rest length of the chain;
/// the result is clamped into the configured range and carries the sign of `input_angle`.
pub fn preferred_angle(
    input_angle: f64,
    normalized_chain_length: f64,
    blend: f64,
    config: &SolverConfig,
) -> f64 {
    let sign = sign_of(input_angle);
    let angle = input_angle.abs();
    let biased = angle * blend - angle * (blend - 1.0) * normalized_chain_length;
    // max/min rather than clamp: an unvalidated range must not panic
    biased
        .max(config.preferred_angle_min)
        .min(config.preferred_angle_max)
        * sign
}

/// Bias written on the dominant axis of `input`; the other two axes are zero.
pub fn preferred_angle_output(
    input: &Vector3<f64>,
    normalized_chain_length: f64,
    blend: f64,
    config: &SolverConfig,
) -> Vector3<f64> {
    let axis = dominant_axis(input);
    let mut out = Vector3::zeros();
    let i = axis.index();
    out[i] = preferred_angle(input[i], normalized_chain_length, blend, config);
    out
}
