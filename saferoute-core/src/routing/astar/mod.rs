//! A* over a working graph with the risk-distance edge cost

mod state;

use std::collections::BinaryHeap;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::debug;

use super::weights::EdgeRisks;
use crate::geodesy::haversine;
use crate::interrupt::Interrupt;
use crate::model::{EdgeKey, WorkingGraph};
use crate::{Error, Meters, NodeId};
use state::State;

/// `cost(edge) = alpha * risk + beta * length`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub alpha: f64,
    pub beta: f64,
}

impl CostModel {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    pub fn edge_cost(&self, risk: f64, length: Meters) -> f64 {
        self.alpha * risk + self.beta * length
    }

    /// Lower bound on the remaining cost from a point `distance` meters away
    /// from the destination. Edge lengths are at least the great-circle
    /// chord and risk is never negative.
    pub fn estimate(&self, distance: Meters) -> f64 {
        self.beta * distance
    }
}

/// Node sequence from start to end, with the edge taken at each step.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundPath {
    pub nodes: Vec<NodeId>,
    /// `edges[i]` leads from `nodes[i]` to `nodes[i + 1]`
    pub edges: Vec<EdgeKey>,
    pub cost: f64,
    /// Number of nodes whose outgoing edges were relaxed
    pub expanded: usize,
}

/// Lowest-cost path from `start` to `end`.
///
/// Entries are never finalized: a node reached again with a lower g-score is
/// pushed again and stale heap entries are skipped on extraction. A start
/// equal to the end yields a single-node path of cost zero.
///
/// `interrupt` is polled after every expansion.
pub fn safest_path(
    graph: &WorkingGraph,
    risks: &EdgeRisks,
    costs: CostModel,
    start: NodeId,
    end: NodeId,
    interrupt: &dyn Interrupt,
) -> Result<FoundPath, Error> {
    let no_path = || Error::NoPath {
        from: start,
        to: end,
    };
    let target = graph.node(end).ok_or_else(no_path)?.geometry;
    let heuristic = |id: NodeId| {
        graph
            .node(id)
            .map_or(0.0, |node| costs.estimate(haversine(node.geometry, target)))
    };

    let mut scores: HashMap<NodeId, f64> = HashMap::new();
    let mut came_from: HashMap<NodeId, (NodeId, EdgeKey)> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut expanded = 0usize;

    heap.push(State {
        priority: heuristic(start),
        cost: 0.0,
        node: start,
    });
    scores.insert(start, 0.0);

    while let Some(State { cost, node, .. }) = heap.pop() {
        // Skip if we've found a better path
        if scores.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        if node == end {
            let (nodes, edges) = reconstruct(&came_from, start, end).ok_or_else(no_path)?;
            debug!(
                "Path {start} -> {end}: {} nodes, cost {cost}, {expanded} expansions",
                nodes.len()
            );
            return Ok(FoundPath {
                nodes,
                edges,
                cost,
                expanded,
            });
        }

        for (edge, next, data) in graph.outgoing(node) {
            let next_cost = cost + costs.edge_cost(risks.risk(edge), data.length);

            let improved = match scores.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    true
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        true
                    } else {
                        false
                    }
                }
            };

            if improved {
                came_from.insert(next, (node, edge));
                heap.push(State {
                    priority: next_cost + heuristic(next),
                    cost: next_cost,
                    node: next,
                });
            }
        }

        expanded += 1;
        interrupt.check()?;
    }

    debug!("No path {start} -> {end} after {expanded} expansions");
    Err(no_path())
}

fn reconstruct(
    came_from: &HashMap<NodeId, (NodeId, EdgeKey)>,
    start: NodeId,
    end: NodeId,
) -> Option<(Vec<NodeId>, Vec<EdgeKey>)> {
    let mut nodes = vec![end];
    let mut edges = Vec::new();
    let mut current = end;

    while current != start {
        let &(previous, edge) = came_from.get(&current)?;
        edges.push(edge);
        nodes.push(previous);
        current = previous;
        if edges.len() > came_from.len() {
            return None;
        }
    }

    nodes.reverse();
    edges.reverse();
    Some((nodes, edges))
}
