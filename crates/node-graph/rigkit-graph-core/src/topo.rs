use crate::error::GraphError;
use crate::types::NodeSpec;
use hashbrown::HashMap;
use std::collections::VecDeque;

/// Order `nodes` so every node comes after the nodes it reads from.
///
/// Returns indices into `nodes`. Independent nodes keep their declaration order, so the
/// evaluation (and therefore the write batch) is deterministic for a given spec.
pub fn topo_order(nodes: &[NodeSpec]) -> Result<Vec<usize>, GraphError> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut indeg = vec![0usize; nodes.len()];
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        for conn in node.inputs.values() {
            let src = *index
                .get(conn.node_id.as_str())
                .ok_or_else(|| GraphError::UnknownNode {
                    node: conn.node_id.clone(),
                    referenced_by: node.id.clone(),
                })?;
            adj[src].push(i);
            indeg[i] += 1;
        }
    }

    let mut q: VecDeque<usize> = (0..nodes.len()).filter(|&i| indeg[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(u) = q.pop_front() {
        order.push(u);
        for &v in &adj[u] {
            indeg[v] -= 1;
            if indeg[v] == 0 {
                q.push_back(v);
            }
        }
    }

    if order.len() != nodes.len() {
        return Err(GraphError::Cycle);
    }
    Ok(order)
}
