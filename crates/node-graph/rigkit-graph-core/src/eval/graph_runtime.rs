//! Mutable runtime state shared by node evaluations.

use crate::error::GraphError;
use crate::schema::{registry_for, Registry};
use crate::types::NodeId;
use hashbrown::HashMap;
use rigkit_api_core::json::parse_value;
use rigkit_api_core::{Shape, TypedPath, Value, WriteBatch};
use rigkit_solver_core::{ChainSolver, SegmentScaleSolver, SolverConfig};

use super::port_value::PortValue;

/// Data staged by the host for consumption by [`NodeType::Input`](crate::types::NodeType::Input).
#[derive(Debug, Clone, PartialEq)]
pub struct StagedInput {
    pub value: Value,
    pub declared: Option<Shape>,
    pub epoch: u64,
}

/// Runtime data shared by all node evaluations.
#[derive(Debug)]
pub struct GraphRuntime {
    pub outputs: HashMap<NodeId, HashMap<String, PortValue>>,
    pub writes: WriteBatch,
    pub staged_inputs: HashMap<TypedPath, StagedInput>,
    pub input_epoch: u64,
    registry: Registry,
    chain_solver: ChainSolver,
    segment_solver: SegmentScaleSolver,
}

impl Default for GraphRuntime {
    fn default() -> Self {
        Self::from_parts(SolverConfig::default())
    }
}

impl GraphRuntime {
    /// Build a runtime whose solver nodes use `config`.
    pub fn with_config(config: SolverConfig) -> Result<Self, GraphError> {
        config.validate().map_err(GraphError::InvalidConfig)?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: SolverConfig) -> Self {
        Self {
            outputs: HashMap::new(),
            writes: WriteBatch::new(),
            staged_inputs: HashMap::new(),
            input_epoch: 0,
            registry: registry_for(&config),
            chain_solver: ChainSolver::new(config.clone()),
            segment_solver: SegmentScaleSolver::new(config),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        self.chain_solver.config()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn chain_solver(&self) -> &ChainSolver {
        &self.chain_solver
    }

    pub(crate) fn segment_solver(&self) -> &SegmentScaleSolver {
        &self.segment_solver
    }

    /// Advance the staging epoch. Values staged for `epoch + 1` become visible for the
    /// upcoming evaluation; older entries are dropped so stale data cannot leak through.
    pub fn advance_epoch(&mut self) {
        self.input_epoch = self.input_epoch.saturating_add(1);
        let current = self.input_epoch;
        self.staged_inputs.retain(|_, staged| staged.epoch == current);
    }

    /// Stage an input value for the next evaluation using a [`TypedPath`] key.
    pub fn set_input(
        &mut self,
        path: TypedPath,
        value: Value,
        declared: Option<Shape>,
    ) -> Option<StagedInput> {
        let staged = StagedInput {
            value,
            declared,
            epoch: self.input_epoch.saturating_add(1),
        };
        self.staged_inputs.insert(path, staged)
    }

    /// Fetch a staged input for the current evaluation epoch, if present.
    pub fn get_input(&self, path: &TypedPath) -> Option<&StagedInput> {
        self.staged_inputs
            .get(path)
            .filter(|staged| staged.epoch == self.input_epoch)
    }

    /// Stage every entry of a JSON object mapping path strings to (shorthand) values.
    ///
    /// Returns how many inputs were staged.
    pub fn stage_json(&mut self, stage: &serde_json::Value) -> Result<usize, GraphError> {
        let Some(entries) = stage.as_object() else {
            return Ok(0);
        };
        for (path, value) in entries {
            let path = TypedPath::parse(path)?;
            let value = parse_value(value.clone())?;
            self.set_input(path, value, None);
        }
        Ok(entries.len())
    }
}
