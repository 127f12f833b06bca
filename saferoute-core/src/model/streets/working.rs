//! Per-request view over one or more regional graphs

use std::sync::Arc;

use hashbrown::HashSet;
use petgraph::graph::EdgeIndex;

use super::{RoadEdge, RoadGraph, RoadNode};
use crate::NodeId;

/// Edge identity inside a working graph: which part, and the edge within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub part: usize,
    pub edge: EdgeIndex,
}

/// Graph used for a single request.
///
/// Cross-region requests see the concatenation of both regional graphs.
/// Nodes are addressed by file id, so a boundary node present in both
/// parts joins them; no synthetic edges are added.
#[derive(Debug, Clone)]
pub struct WorkingGraph {
    parts: Vec<Arc<RoadGraph>>,
}

impl WorkingGraph {
    pub fn single(graph: Arc<RoadGraph>) -> Self {
        Self { parts: vec![graph] }
    }

    pub fn merged(parts: Vec<Arc<RoadGraph>>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[Arc<RoadGraph>] {
        &self.parts
    }

    pub fn edge_count(&self) -> usize {
        self.parts.iter().map(|part| part.edge_count()).sum()
    }

    /// First part that knows `id` provides its coordinates.
    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.parts.iter().find_map(|part| part.node(id))
    }

    /// Every node once, even when shared between parts.
    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        let mut seen = HashSet::new();
        self.parts
            .iter()
            .flat_map(|part| part.nodes())
            .filter(move |node| seen.insert(node.id))
    }

    /// Outgoing edges of `id` across all parts.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = (EdgeKey, NodeId, &RoadEdge)> {
        self.parts.iter().enumerate().flat_map(move |(part, graph)| {
            graph
                .outgoing(id)
                .map(move |(edge, target, data)| (EdgeKey { part, edge }, target, data))
        })
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&RoadEdge> {
        self.parts.get(key.part).and_then(|part| part.edge(key.edge))
    }
}
