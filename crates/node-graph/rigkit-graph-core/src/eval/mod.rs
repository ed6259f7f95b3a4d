//! Evaluation pipeline for the rigkit node graph.
//!
//! - [`graph_runtime`] holds staged inputs, per-node outputs and the write batch.
//! - [`port_value`] pairs values with shapes and converts them for the solvers.
//! - [`eval_node`] dispatches on [`NodeType`](crate::types::NodeType).
//!
//! Integration code should primarily interact with [`GraphRuntime`] and [`evaluate_all`].

use crate::error::GraphError;
use crate::types::GraphSpec;
use rigkit_api_core::WriteBatch;

pub mod eval_node;
mod graph_runtime;
mod port_value;

pub use eval_node::eval_node;
pub use graph_runtime::{GraphRuntime, StagedInput};
pub use port_value::PortValue;


/// Evaluate every node in `spec`, updating `rt` in-place.
///
/// Inputs staged since the previous call become visible, outputs and writes are rebuilt from
/// scratch, and nodes run in topological order. The first failing node halts evaluation.
pub fn evaluate_all(rt: &mut GraphRuntime, spec: &GraphSpec) -> Result<(), GraphError> {
    rt.advance_epoch();
    rt.outputs.clear();
    rt.writes = WriteBatch::new();

    let order = crate::topo::topo_order(&spec.nodes)?;
    for idx in order {
        eval_node::eval_node(rt, &spec.nodes[idx])?;
    }
    Ok(())
}
