//! Write operations emitted by the graph towards the host's output sink.
//!
//! WriteOp serializes to JSON as:
//!   { "path": "rig/arm_L/ikChain.startLength", "value": { "type": "float", "data": 5.0 } }
//!
//! WriteBatch is a thin Vec<WriteOp> wrapper; hosts apply it in order.

use crate::{typed_path::TypedPath, Shape, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub path: TypedPath,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
}

impl WriteOp {
    pub fn new(path: TypedPath, value: Value) -> Self {
        Self::new_with_shape(path, value, None)
    }

    pub fn new_with_shape(path: TypedPath, value: Value, shape: Option<Shape>) -> Self {
        Self { path, value, shape }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last value written to `path` in this batch, if any.
    pub fn value_at(&self, path: &TypedPath) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|op| op.path == *path)
            .map(|op| &op.value)
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = serde_json::to_string(&self.value).map_err(|_| fmt::Error)?;
        write!(f, "{} = {}", self.path, val)
    }
}
