use hashbrown::HashMap;
use rigkit_api_core::json::normalize_graph_spec_json;
use rigkit_api_core::{TypedPath, Value};
use serde::{Deserialize, Serialize};

use crate::GraphError;

pub type NodeId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Constant,

    // Host boundary
    Input,
    Output,

    // Solvers
    TwoBoneIk,
    TwoBoneStretch,
    SegmentScale,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeParams {
    /// Constant value, or the fallback of an `Input` node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Staged input read by `Input`, write target of `Output`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<TypedPath>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConnection {
    pub node_id: NodeId,
    #[serde(default = "default_output_key")]
    pub output_key: String,
}

impl InputConnection {
    pub fn new(node_id: impl Into<NodeId>, output_key: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            output_key: output_key.into(),
        }
    }
}

fn default_output_key() -> String {
    "out".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub params: NodeParams,
    #[serde(default)]
    pub inputs: HashMap<String, InputConnection>,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, kind: NodeType) -> Self {
        Self {
            id: id.into(),
            kind,
            params: NodeParams::default(),
            inputs: HashMap::new(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.params.value = Some(value);
        self
    }

    pub fn with_path(mut self, path: TypedPath) -> Self {
        self.params.path = Some(path);
        self
    }

    /// Connect input `port` to `output_key` of node `from`.
    pub fn connect(
        mut self,
        port: impl Into<String>,
        from: impl Into<NodeId>,
        output_key: impl Into<String>,
    ) -> Self {
        self.inputs
            .insert(port.into(), InputConnection::new(from, output_key));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
}

impl GraphSpec {
    /// Parse a graph from JSON, accepting shorthand values and mixed-case node types.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let normalized = normalize_graph_spec_json(json)?;
        serde_json::from_value(normalized).map_err(|e| GraphError::Json(e.into()))
    }

    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
