//! Coercion helpers between Value shapes.
//!
//! Hosts are loose about what they wire into a port; the rules below keep evaluation total:
//! - scalars broadcast into triples
//! - triples become translation matrices
//! - matrices expose their translation when read as a triple

use crate::value::IDENTITY_MATRIX;
use crate::Value;

/// Coerce a Value into a scalar.
/// - Float -> its value
/// - Bool -> 1.0 / 0.0
/// - Vec3 -> first component
/// - Matrix -> x translation
pub fn to_float(v: &Value) -> f64 {
    match v {
        Value::Float(f) => *f,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Vec3(a) => a[0],
        Value::Matrix(m) => m[12],
    }
}

/// Non-zero numbers count as `true`.
pub fn to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Float(f) => *f != 0.0,
        Value::Vec3(a) => a.iter().any(|x| *x != 0.0),
        Value::Matrix(_) => true,
    }
}

/// Coerce a Value into a triple. Scalars broadcast (`s -> [s, s, s]`).
pub fn to_vec3(v: &Value) -> [f64; 3] {
    match v {
        Value::Vec3(a) => *a,
        Value::Float(f) => [*f, *f, *f],
        Value::Bool(b) => {
            let s = if *b { 1.0 } else { 0.0 };
            [s, s, s]
        }
        Value::Matrix(m) => [m[12], m[13], m[14]],
    }
}

/// Coerce a Value into a column-major matrix.
/// - Matrix -> itself
/// - Vec3 -> translation matrix
/// - anything else -> identity
pub fn to_matrix(v: &Value) -> [f64; 16] {
    match v {
        Value::Matrix(m) => *m,
        Value::Vec3(a) => {
            let mut m = IDENTITY_MATRIX;
            m[12..15].copy_from_slice(a);
            m
        }
        _ => IDENTITY_MATRIX,
    }
}
