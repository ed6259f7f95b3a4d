//! rigkit-api-core: value, shape and write-batch types shared between the solver host and
//! its embedders (engine-agnostic).

pub mod coercion;
pub mod json;
pub mod shape;
pub mod typed_path;
pub mod value;
pub mod write_ops;

pub use shape::{Shape, ShapeId};
pub use typed_path::{PathError, TypedPath};
pub use value::{Value, ValueKind, IDENTITY_MATRIX};
pub use write_ops::{WriteBatch, WriteOp};
