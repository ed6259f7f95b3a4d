//! Node registry: ports, defaults and documented ranges for every [`NodeType`].
//!
//! The evaluator fills unconnected inputs from [`PortSpec::default`] and clamps connected
//! scalars into `[min, max]`. Length and scale floors follow [`SolverConfig::min_length`].
//! Hosts can serialize the registry to build their own UI.

use crate::types::NodeType;
use rigkit_api_core::{ShapeId, Value, IDENTITY_MATRIX};
use rigkit_solver_core::SolverConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Float,
    Vec3,
    Matrix,
    Any,
}

impl PortType {
    pub fn shape_id(self) -> Option<ShapeId> {
        match self {
            PortType::Float => Some(ShapeId::Scalar),
            PortType::Vec3 => Some(ShapeId::Vec3),
            PortType::Matrix => Some(ShapeId::Matrix),
            PortType::Any => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortSpec {
    pub id: &'static str,
    pub ty: PortType,
    pub label: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub doc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl PortSpec {
    /// Clamp `v` into the documented range; open ends are left alone.
    pub fn clamp(&self, v: f64) -> f64 {
        let v = self.min.map_or(v, |lo| v.max(lo));
        self.max.map_or(v, |hi| v.min(hi))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub doc: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSignature {
    pub type_id: NodeType,
    pub name: &'static str,
    pub category: &'static str,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
    pub params: Vec<ParamSpec>,
}

impl NodeSignature {
    pub fn input(&self, id: &str) -> Option<&PortSpec> {
        self.inputs.iter().find(|p| p.id == id)
    }

    pub fn output(&self, id: &str) -> Option<&PortSpec> {
        self.outputs.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registry {
    pub version: &'static str,
    pub nodes: Vec<NodeSignature>,
}

impl Registry {
    pub fn signature(&self, kind: NodeType) -> Option<&NodeSignature> {
        self.nodes.iter().find(|n| n.type_id == kind)
    }
}

// Helpers
fn port(id: &'static str, ty: PortType, label: &'static str) -> PortSpec {
    PortSpec {
        id,
        ty,
        label,
        doc: "",
        default: None,
        min: None,
        max: None,
    }
}

fn matrix_in(id: &'static str, label: &'static str, doc: &'static str) -> PortSpec {
    PortSpec {
        doc,
        default: Some(Value::Matrix(IDENTITY_MATRIX)),
        ..port(id, PortType::Matrix, label)
    }
}

fn vec3_in(id: &'static str, label: &'static str, doc: &'static str) -> PortSpec {
    PortSpec {
        doc,
        default: Some(Value::Vec3([0.0; 3])),
        ..port(id, PortType::Vec3, label)
    }
}

fn float_in(
    id: &'static str,
    label: &'static str,
    default: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> PortSpec {
    PortSpec {
        default: Some(Value::Float(default)),
        min,
        max,
        ..port(id, PortType::Float, label)
    }
}

fn unit_in(id: &'static str, label: &'static str, default: f64) -> PortSpec {
    float_in(id, label, default, Some(0.0), Some(1.0))
}

fn length_in(id: &'static str, label: &'static str, min_length: f64) -> PortSpec {
    float_in(id, label, 1.0, Some(min_length), None)
}

fn float_out(id: &'static str, label: &'static str) -> PortSpec {
    port(id, PortType::Float, label)
}

fn path_param(doc: &'static str) -> ParamSpec {
    ParamSpec {
        id: "path",
        label: "Path",
        doc,
        required: true,
    }
}

fn chain_length_inputs(min_length: f64) -> Vec<PortSpec> {
    vec![
        length_in("start_initial_length", "Start Initial Length", min_length),
        length_in("end_initial_length", "End Initial Length", min_length),
        length_in("start_scale_multiplier", "Start Scale", min_length),
        length_in("end_scale_multiplier", "End Scale", min_length),
        length_in("global_scale", "Global Scale", min_length),
    ]
}

/// Registry with the default [`SolverConfig`] floors.
pub fn registry() -> Registry {
    registry_for(&SolverConfig::default())
}

/// Registry whose length and scale ports are floored at `config.min_length`.
pub fn registry_for(config: &SolverConfig) -> Registry {
    use NodeType::*;
    let min_length = config.min_length;
    let mut nodes: Vec<NodeSignature> = Vec::new();

    nodes.push(NodeSignature {
        type_id: Constant,
        name: "Constant",
        category: "Values",
        inputs: vec![],
        outputs: vec![port("out", PortType::Any, "Out")],
        params: vec![ParamSpec {
            id: "value",
            label: "Value",
            doc: "",
            required: true,
        }],
    });

    nodes.push(NodeSignature {
        type_id: Input,
        name: "Input",
        category: "Host",
        inputs: vec![],
        outputs: vec![port("out", PortType::Any, "Out")],
        params: vec![
            path_param("Staged input to read"),
            ParamSpec {
                id: "value",
                label: "Fallback",
                doc: "Used when nothing is staged at `path`",
                required: false,
            },
        ],
    });

    nodes.push(NodeSignature {
        type_id: Output,
        name: "Output",
        category: "Host",
        inputs: vec![PortSpec {
            default: Some(Value::Float(0.0)),
            ..port("in", PortType::Any, "In")
        }],
        outputs: vec![port("out", PortType::Any, "Out")],
        params: vec![path_param("Write target")],
    });

    let mut ik_inputs = vec![
        matrix_in("start_matrix", "Start Matrix", "World matrix of the chain root"),
        matrix_in(
            "handle_parent_matrix",
            "Handle Parent Matrix",
            "World matrix of the handle's parent",
        ),
        vec3_in(
            "handle_translate",
            "Handle Translate",
            "Handle offset in the parent's space",
        ),
        matrix_in("pole_matrix", "Pole Vector Matrix", ""),
    ];
    ik_inputs.extend(chain_length_inputs(min_length));
    ik_inputs.extend([
        float_in("direction", "Direction", 1.0, Some(-1.0), Some(1.0)),
        float_in("slide", "Slide", 0.0, Some(-1.0), Some(1.0)),
        unit_in("stretch", "Stretch", 0.0),
        float_in("softness", "Softness", 1.0, Some(0.0), None),
        unit_in("volumetric", "Volumetric", 1.0),
        unit_in("pole_vector_lock", "Pole Vector Lock", 0.0),
        vec3_in(
            "preferred_angle",
            "Preferred Angle",
            "Degrees; the largest axis drives the bias",
        ),
        float_in("preferred_angle_blend", "Preferred Angle Blend", 7.0, None, None),
    ]);

    nodes.push(NodeSignature {
        type_id: TwoBoneIk,
        name: "Two Bone IK",
        category: "Rigging",
        inputs: ik_inputs,
        outputs: vec![
            float_out("start_length", "Start Length"),
            float_out("end_length", "End Length"),
            float_out("start_scale", "Start Scale"),
            float_out("end_scale", "End Scale"),
            port("preferred_angle", PortType::Vec3, "Preferred Angle"),
        ],
        params: vec![],
    });

    let mut stretch_inputs = vec![
        matrix_in("start_matrix", "Start Matrix", "World matrix of the chain root"),
        matrix_in("end_matrix", "End Matrix", "World matrix of the handle"),
        matrix_in("pole_matrix", "Pole Vector Matrix", ""),
    ];
    stretch_inputs.extend(chain_length_inputs(min_length));
    stretch_inputs.extend([
        float_in("slide", "Slide", 0.0, Some(-1.0), Some(1.0)),
        unit_in("stretch", "Stretch", 1.0),
        float_in("softness", "Softness", 1.0, Some(0.0), None),
        unit_in("pole_vector_lock", "Pole Vector Lock", 0.0),
        float_in("output_scale", "Output Scale", 1.0, None, None),
    ]);

    nodes.push(NodeSignature {
        type_id: TwoBoneStretch,
        name: "Two Bone Stretch",
        category: "Rigging",
        inputs: stretch_inputs,
        outputs: vec![
            float_out("start_length", "Start Length"),
            float_out("end_length", "End Length"),
        ],
        params: vec![],
    });

    nodes.push(NodeSignature {
        type_id: SegmentScale,
        name: "Segment Scale",
        category: "Rigging",
        inputs: vec![
            matrix_in("driver_matrix", "Scale Driver Matrix", "Joint whose scale is driven"),
            matrix_in("parent_matrix", "Scale Parent Matrix", ""),
            vec3_in("translate", "Scale Translate", "Offset in the parent's space"),
            length_in("initial_length", "Initial Length", min_length),
            unit_in("volumetric", "Volumetric", 1.0),
            length_in("global_scale", "Global Scale", min_length),
        ],
        outputs: vec![
            float_out("scale", "Output Scale"),
            float_out("inverse_scale", "Output Inverse Scale"),
        ],
        params: vec![],
    });

    Registry {
        version: env!("CARGO_PKG_VERSION"),
        nodes,
    }
}
