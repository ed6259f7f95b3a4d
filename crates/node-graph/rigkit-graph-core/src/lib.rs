//! rigkit-graph-core: a small host evaluator for the rigkit solvers.
//!
//! A [`GraphSpec`] wires `Input` nodes (values staged by the host), solver nodes and `Output`
//! nodes (which publish to the runtime's [`WriteBatch`](rigkit_api_core::WriteBatch)).
//! [`evaluate_all`] recomputes every node in dependency order on each call.

pub mod error;
pub mod eval;
pub mod schema;
pub mod topo;
pub mod types;

pub use error::GraphError;
pub use eval::{eval_node, evaluate_all, GraphRuntime, PortValue, StagedInput};
pub use schema::{registry, registry_for, NodeSignature, PortSpec, PortType, Registry};
pub use topo::topo_order;
pub use types::*;
