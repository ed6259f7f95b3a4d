//! Geometry and scalar helpers shared by the solvers.
//!
//! Transforms use nalgebra's column-vector convention: a point is moved by `m * p` and the
//! translation lives in column 3. Hosts that store row-vector matrices (translation in the
//! last row) go through [`transform_from_row_major`].

use nalgebra::{Matrix4, Vector3};

/// 4x4 affine transform (rotation, scale and translation).
pub type Transform = Matrix4<f64>;

/// Fallback divisor used by [`reciprocal`] and [`safe_divide`] when handed an exact zero.
pub const SMALL_NUMBER: f64 = 1.0e-3;

/// World position encoded in `m`.
#[inline]
pub fn position(m: &Transform) -> Vector3<f64> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Translation-only transform.
#[inline]
pub fn translation_matrix(t: &Vector3<f64>) -> Transform {
    Matrix4::new_translation(t)
}

/// Position of a child sitting at `offset` in `parent`'s space.
#[inline]
pub fn offset_position(parent: &Transform, offset: &Vector3<f64>) -> Vector3<f64> {
    position(&(parent * translation_matrix(offset)))
}

#[inline]
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (b - a).norm()
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Sign of `x` as `±1.0`; zero counts as positive.
#[inline]
pub fn sign_of(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// `1 / x`, treating an exact zero as [`SMALL_NUMBER`].
#[inline]
pub fn reciprocal(x: f64) -> f64 {
    let x = if x == 0.0 { SMALL_NUMBER } else { x };
    1.0 / x
}

/// `a / b`, treating an exact zero divisor as [`SMALL_NUMBER`].
#[inline]
pub fn safe_divide(a: f64, b: f64) -> f64 {
    let b = if b == 0.0 { SMALL_NUMBER } else { b };
    a / b
}

/// Convert a row-vector host matrix (translation in the last row) into a [`Transform`].
pub fn transform_from_row_major(rows: [[f64; 4]; 4]) -> Transform {
    Matrix4::from_fn(|r, c| rows[c][r])
}

/// Clamp an input into `[lo, hi]`, logging when the host handed us something outside the
/// documented range. NaN lands on `lo`; a NaN or inverted bound never panics.
pub(crate) fn clamp_input(field: &'static str, value: f64, lo: f64, hi: f64) -> f64 {
    let clamped = value.max(lo).min(hi);
    if clamped != value {
        log::debug!("clamping {field} from {value} into [{lo}, {hi}]");
    }
    clamped
}

/// Floor an input at `min`, logging when it was below. Non-finite values also become `min`.
pub(crate) fn floor_input(field: &'static str, value: f64, min: f64) -> f64 {
    if value.is_finite() && value >= min {
        value
    } else {
        log::debug!("flooring {field} from {value} to {min}");
        min
    }
}
