use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    scenarios: HashMap<String, String>,
    #[serde(rename = "node-graphs")]
    node_graphs: HashMap<String, NodeGraphEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeGraphEntry {
    spec: String,
    #[serde(default)]
    stage: Option<String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// One chain placement with its controls and the outputs it should produce.
///
/// Positions are world-space points; the consumer builds whatever transform type it needs.
/// Omitted expectations are not checked.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainScenario {
    pub name: String,
    #[serde(default)]
    pub start: [f64; 3],
    pub handle: [f64; 3],
    #[serde(default)]
    pub pole: [f64; 3],
    pub start_length: f64,
    pub end_length: f64,
    #[serde(default)]
    pub controls: HashMap<String, f64>,
    #[serde(default)]
    pub preferred_angle: Option<[f64; 3]>,
    pub expected: ChainExpectation,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl ChainScenario {
    /// Control value, or `default` when the scenario leaves it out.
    pub fn control(&self, name: &str, default: f64) -> f64 {
        self.controls.get(name).copied().unwrap_or(default)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainExpectation {
    pub start_length: Option<f64>,
    pub end_length: Option<f64>,
    pub start_scale: Option<f64>,
    pub end_scale: Option<f64>,
    pub preferred_angle: Option<[f64; 3]>,
}

/// One FK segment placement and its expected scales.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentScenario {
    pub name: String,
    #[serde(default)]
    pub driver: [f64; 3],
    pub target: [f64; 3],
    pub reference_length: f64,
    #[serde(default = "one")]
    pub volumetric: f64,
    #[serde(default = "one")]
    pub global_scale: f64,
    pub expected_scale: f64,
    pub expected_inverse_scale: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    1.0e-9
}

fn one() -> f64 {
    1.0
}

pub mod scenarios {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.scenarios.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.scenarios, "scenario", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.scenarios, "scenario", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.scenarios, "scenario", name)?;
        Ok(resolve_path(rel))
    }

    /// Two-bone chain scenarios shared by the solver and graph tests.
    pub fn chain() -> Result<Vec<ChainScenario>> {
        load("chain")
    }

    pub fn segment() -> Result<Vec<SegmentScenario>> {
        load("segment")
    }
}

pub mod node_graphs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.node_graphs.keys().cloned().collect()
    }

    pub fn spec_json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        read_to_string(&entry.spec)
    }

    pub fn spec<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        super::load_json(&entry.spec)
    }

    pub fn stage_json(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        match &entry.stage {
            Some(stage) => read_to_string(stage).map(Some),
            None => Ok(None),
        }
    }

    pub fn stage<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        match &entry.stage {
            Some(stage) => super::load_json(stage).map(Some),
            None => Ok(None),
        }
    }

    pub fn spec_path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        Ok(resolve_path(&entry.spec))
    }
}
