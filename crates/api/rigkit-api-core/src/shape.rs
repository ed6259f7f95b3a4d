//! Shape definitions (schema/type) for port values.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::Value;

/// Structural type of a port value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShapeId {
    Scalar,
    Bool,
    Vec3,
    /// 4x4 affine transform
    Matrix,
}

impl ShapeId {
    /// Shape describing `value` as-is.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Float(_) => ShapeId::Scalar,
            Value::Bool(_) => ShapeId::Bool,
            Value::Vec3(_) => ShapeId::Vec3,
            Value::Matrix(_) => ShapeId::Matrix,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        ShapeId::of(value) == *self
    }
}

/// A Shape pairs an identity (ShapeId) with optional metadata such as units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shape {
    pub id: ShapeId,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, String>,
}

impl Shape {
    pub fn new(id: ShapeId) -> Self {
        Shape {
            id,
            meta: HashMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}
