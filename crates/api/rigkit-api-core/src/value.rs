//! Value: runtime instances that flow between graph ports.
//! All numeric data is `f64`; rig attributes are double precision on every host we target.

use serde::{Deserialize, Serialize};

/// Column-major 4x4 identity.
pub const IDENTITY_MATRIX: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Coarse kind of a [`Value`], handy for dispatch and error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Vec3,
    Matrix,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar attribute (lengths, blend factors, angles in degrees)
    Float(f64),

    /// Boolean attribute
    Bool(bool),

    /// Three-component triple (translations, angle triples)
    Vec3([f64; 3]),

    /// 4x4 affine matrix, column-major; translation occupies elements 12..15.
    Matrix([f64; 16]),
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Matrix(_) => ValueKind::Matrix,
        }
    }

    pub fn f(v: f64) -> Self {
        Value::Float(v)
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Value::Vec3([x, y, z])
    }

    /// A matrix carrying only a translation.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = IDENTITY_MATRIX;
        m[12] = x;
        m[13] = y;
        m[14] = z;
        Value::Matrix(m)
    }

    /// Build a matrix from row-major rows where translation sits in the last row, the layout
    /// used by row-vector hosts.
    pub fn matrix_from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = [0.0; 16];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                // a row-vector host's row r is our column r
                m[r * 4 + c] = *v;
            }
        }
        Value::Matrix(m)
    }

    /// True when every numeric component is finite. Booleans are always finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(f) => f.is_finite(),
            Value::Bool(_) => true,
            Value::Vec3(a) => a.iter().all(|x| x.is_finite()),
            Value::Matrix(m) => m.iter().all(|x| x.is_finite()),
        }
    }
}
