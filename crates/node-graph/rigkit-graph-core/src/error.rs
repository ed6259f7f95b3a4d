use rigkit_api_core::json::JsonError;
use rigkit_api_core::{PathError, TypedPath};
use rigkit_solver_core::SolverError;
use thiserror::Error;

use crate::types::{NodeId, NodeType};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cycle detected in graph")]
    Cycle,

    #[error("node '{node}' is missing required param '{param}'")]
    MissingParam { node: NodeId, param: &'static str },

    #[error("input node '{node}' has no staged value for '{path}' and no default")]
    MissingInput { node: NodeId, path: TypedPath },

    #[error("node '{referenced_by}' is connected to unknown node '{node}'")]
    UnknownNode { node: NodeId, referenced_by: NodeId },

    #[error("node type {0:?} has no registry signature")]
    UnregisteredType(NodeType),

    #[error("node '{node}' received a non-finite value on port '{port}'")]
    NonFiniteInput { node: NodeId, port: String },

    #[error("solver rejected inputs of node '{node}'")]
    Solver {
        node: NodeId,
        #[source]
        source: SolverError,
    },

    #[error("invalid solver configuration")]
    InvalidConfig(#[source] SolverError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Json(#[from] JsonError),
}
