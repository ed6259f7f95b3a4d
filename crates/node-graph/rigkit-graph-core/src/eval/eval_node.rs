//! Per-node evaluation logic for the rigkit graph runtime.

use crate::error::GraphError;
use crate::eval::graph_runtime::{GraphRuntime, StagedInput};
use crate::schema::{NodeSignature, PortSpec};
use crate::types::{InputConnection, NodeParams, NodeSpec, NodeType};
use hashbrown::HashMap;
use nalgebra::Vector3;
use rigkit_api_core::{Value, WriteOp};
use rigkit_solver_core::{ChainInputs, SegmentScaleInputs, Transform};

use super::port_value::PortValue;

type OutputMap = HashMap<String, PortValue>;

/// Build an output map from `(port, value)` pairs.
fn keyed_outputs<const N: usize>(ports: [(&str, Value); N]) -> OutputMap {
    let mut map = HashMap::with_capacity(N);
    for (key, value) in ports {
        map.insert(key.to_string(), PortValue::new(value));
    }
    map
}

fn single_output(port: PortValue) -> OutputMap {
    let mut map = HashMap::with_capacity(1);
    map.insert("out".to_string(), port);
    map
}

/// Evaluate a single node, updating `rt` with new outputs and queued writes.
pub fn eval_node(rt: &mut GraphRuntime, spec: &NodeSpec) -> Result<(), GraphError> {
    log::trace!("evaluating node '{}' ({:?})", spec.id, spec.kind);
    let inputs = read_inputs(rt, spec);
    let outputs = evaluate_kind(rt, spec, &inputs)?;

    // Only explicit sink nodes publish external writes.
    if spec.kind == NodeType::Output {
        let path = spec
            .params
            .path
            .clone()
            .ok_or_else(|| missing_param(spec, "path"))?;
        if let Some(port) = outputs.get("out") {
            rt.writes.push(WriteOp::new_with_shape(
                path,
                port.value.clone(),
                Some(port.shape.clone()),
            ));
        }
    }
    rt.outputs.insert(spec.id.clone(), outputs);
    Ok(())
}

fn evaluate_kind(
    rt: &GraphRuntime,
    spec: &NodeSpec,
    inputs: &HashMap<String, PortValue>,
) -> Result<OutputMap, GraphError> {
    let params = &spec.params;
    match spec.kind {
        NodeType::Constant => eval_constant(spec, params),
        NodeType::Input => eval_input_node(rt, spec),
        NodeType::Output => Ok(eval_output(inputs)),
        kind @ (NodeType::TwoBoneIk | NodeType::TwoBoneStretch | NodeType::SegmentScale) => {
            let signature = rt
                .registry()
                .signature(kind)
                .ok_or(GraphError::UnregisteredType(kind))?;
            let ports = SolverPorts {
                node: spec,
                signature,
                inputs,
            };
            match kind {
                NodeType::TwoBoneIk => eval_two_bone_ik(rt, &ports),
                NodeType::TwoBoneStretch => eval_two_bone_stretch(rt, &ports),
                _ => eval_segment_scale(rt, &ports),
            }
        }
    }
}

fn missing_param(spec: &NodeSpec, param: &'static str) -> GraphError {
    GraphError::MissingParam {
        node: spec.id.clone(),
        param,
    }
}

fn eval_constant(spec: &NodeSpec, params: &NodeParams) -> Result<OutputMap, GraphError> {
    let value = params
        .value
        .clone()
        .ok_or_else(|| missing_param(spec, "value"))?;
    Ok(single_output(PortValue::new(value)))
}

fn eval_output(inputs: &HashMap<String, PortValue>) -> OutputMap {
    let port = inputs
        .get("in")
        .cloned()
        .unwrap_or_else(|| PortValue::new(Value::Float(0.0)));
    single_output(port)
}

fn eval_input_node(rt: &GraphRuntime, spec: &NodeSpec) -> Result<OutputMap, GraphError> {
    let params = &spec.params;
    let path = params
        .path
        .as_ref()
        .ok_or_else(|| missing_param(spec, "path"))?;

    if let Some(StagedInput {
        value, declared, ..
    }) = rt.get_input(path).cloned()
    {
        let mut port = PortValue::new(value);
        if let Some(shape) = declared {
            port.set_shape(shape);
        }
        return Ok(single_output(port));
    }

    if let Some(default_value) = params.value.clone() {
        return Ok(single_output(PortValue::new(default_value)));
    }

    Err(GraphError::MissingInput {
        node: spec.id.clone(),
        path: path.clone(),
    })
}

/// Resolved inputs of a solver node. Unconnected ports fall back to the registry default,
/// connected scalars are clamped into the registry range.
struct SolverPorts<'a> {
    node: &'a NodeSpec,
    signature: &'a NodeSignature,
    inputs: &'a HashMap<String, PortValue>,
}

impl SolverPorts<'_> {
    fn spec(&self, port: &'static str) -> Result<&PortSpec, GraphError> {
        self.signature
            .input(port)
            .ok_or(GraphError::UnregisteredType(self.node.kind))
    }

    fn port(&self, port: &'static str) -> Result<PortValue, GraphError> {
        if let Some(connected) = self.inputs.get(port) {
            if !connected.value.is_finite() {
                log::warn!(
                    "rejecting non-finite value on '{}.{}': {:?}",
                    self.node.id,
                    port,
                    connected.value
                );
                return Err(GraphError::NonFiniteInput {
                    node: self.node.id.clone(),
                    port: port.to_string(),
                });
            }
            return Ok(connected.clone());
        }
        let default = self
            .spec(port)?
            .default
            .clone()
            .unwrap_or(Value::Float(0.0));
        Ok(PortValue::new(default))
    }

    fn scalar(&self, port: &'static str) -> Result<f64, GraphError> {
        let raw = self.port(port)?.as_float();
        let clamped = self.spec(port)?.clamp(raw);
        if clamped != raw {
            log::debug!(
                "clamping '{}.{}' from {raw} to {clamped}",
                self.node.id,
                port
            );
        }
        Ok(clamped)
    }

    fn vector(&self, port: &'static str) -> Result<Vector3<f64>, GraphError> {
        Ok(self.port(port)?.as_vector())
    }

    fn transform(&self, port: &'static str) -> Result<Transform, GraphError> {
        Ok(self.port(port)?.as_transform())
    }

    fn solver_error(&self, source: rigkit_solver_core::SolverError) -> GraphError {
        log::warn!("solver rejected node '{}': {source}", self.node.id);
        GraphError::Solver {
            node: self.node.id.clone(),
            source,
        }
    }
}

fn eval_two_bone_ik(rt: &GraphRuntime, ports: &SolverPorts<'_>) -> Result<OutputMap, GraphError> {
    let inputs = ChainInputs {
        start_transform: ports.transform("start_matrix")?,
        handle_parent_transform: ports.transform("handle_parent_matrix")?,
        handle_local_translation: ports.vector("handle_translate")?,
        pole_transform: ports.transform("pole_matrix")?,
        start_reference_length: ports.scalar("start_initial_length")?,
        end_reference_length: ports.scalar("end_initial_length")?,
        start_scale_multiplier: ports.scalar("start_scale_multiplier")?,
        end_scale_multiplier: ports.scalar("end_scale_multiplier")?,
        global_scale: ports.scalar("global_scale")?,
        direction_sign: ports.scalar("direction")?,
        slide: ports.scalar("slide")?,
        stretch: ports.scalar("stretch")?,
        softness: ports.scalar("softness")?,
        volumetric: ports.scalar("volumetric")?,
        pole_vector_lock: ports.scalar("pole_vector_lock")?,
        preferred_angle_input: ports.vector("preferred_angle")?,
        preferred_angle_blend: ports.scalar("preferred_angle_blend")?,
    };
    let out = rt
        .chain_solver()
        .solve_checked(&inputs)
        .map_err(|e| ports.solver_error(e))?;

    let angle = out.preferred_angle_output;
    Ok(keyed_outputs([
        ("start_length", Value::Float(out.start_output_length)),
        ("end_length", Value::Float(out.end_output_length)),
        ("start_scale", Value::Float(out.start_output_scale)),
        ("end_scale", Value::Float(out.end_output_scale)),
        ("preferred_angle", Value::vec3(angle.x, angle.y, angle.z)),
    ]))
}

/// The matrix-driven variant: the handle is `end_matrix` itself, there is no volume
/// compensation and both lengths are multiplied by `output_scale`.
fn eval_two_bone_stretch(
    rt: &GraphRuntime,
    ports: &SolverPorts<'_>,
) -> Result<OutputMap, GraphError> {
    let inputs = ChainInputs {
        start_transform: ports.transform("start_matrix")?,
        handle_parent_transform: ports.transform("end_matrix")?,
        handle_local_translation: Vector3::zeros(),
        pole_transform: ports.transform("pole_matrix")?,
        start_reference_length: ports.scalar("start_initial_length")?,
        end_reference_length: ports.scalar("end_initial_length")?,
        start_scale_multiplier: ports.scalar("start_scale_multiplier")?,
        end_scale_multiplier: ports.scalar("end_scale_multiplier")?,
        global_scale: ports.scalar("global_scale")?,
        slide: ports.scalar("slide")?,
        stretch: ports.scalar("stretch")?,
        softness: ports.scalar("softness")?,
        pole_vector_lock: ports.scalar("pole_vector_lock")?,
        volumetric: 0.0,
        ..ChainInputs::default()
    };
    let output_scale = ports.scalar("output_scale")?;
    let out = rt
        .chain_solver()
        .solve_checked(&inputs)
        .map_err(|e| ports.solver_error(e))?;

    Ok(keyed_outputs([
        (
            "start_length",
            Value::Float(out.start_output_length * output_scale),
        ),
        ("end_length", Value::Float(out.end_output_length * output_scale)),
    ]))
}

fn eval_segment_scale(
    rt: &GraphRuntime,
    ports: &SolverPorts<'_>,
) -> Result<OutputMap, GraphError> {
    let inputs = SegmentScaleInputs {
        driver_transform: ports.transform("driver_matrix")?,
        parent_transform: ports.transform("parent_matrix")?,
        local_translation_offset: ports.vector("translate")?,
        reference_length: ports.scalar("initial_length")?,
        volumetric: ports.scalar("volumetric")?,
        global_scale: ports.scalar("global_scale")?,
    };
    let out = rt
        .segment_solver()
        .solve_checked(&inputs)
        .map_err(|e| ports.solver_error(e))?;

    Ok(keyed_outputs([
        ("scale", Value::Float(out.normalized_scale)),
        ("inverse_scale", Value::Float(out.inverse_scale)),
    ]))
}

/// Gather the most recent outputs for each of the node's input connections.
///
/// A connection to a port the upstream node never produced is dropped with a warning, which
/// leaves the input at its default.
fn read_inputs(rt: &GraphRuntime, spec: &NodeSpec) -> HashMap<String, PortValue> {
    let mut resolved = HashMap::with_capacity(spec.inputs.len());

    for (input_key, conn) in spec.inputs.iter() {
        match upstream_port(rt, conn) {
            Some(port) => {
                resolved.insert(input_key.clone(), port);
            }
            None => log::warn!(
                "node '{}' input '{}' reads missing port {}:{}",
                spec.id,
                input_key,
                conn.node_id,
                conn.output_key
            ),
        }
    }

    resolved
}

fn upstream_port(rt: &GraphRuntime, conn: &InputConnection) -> Option<PortValue> {
    rt.outputs
        .get(&conn.node_id)
        .and_then(|outputs| outputs.get(&conn.output_key))
        .cloned()
}
