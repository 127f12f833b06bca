//! Regional road graph and its catalog key

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use super::{RoadEdge, RoadNode};
use crate::{Error, NodeId};

/// Travel modality a graph file was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum NetworkType {
    Walk,
    Bike,
    Drive,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Walk => "walk",
            NetworkType::Bike => "bike",
            NetworkType::Drive => "drive",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(NetworkType::Walk),
            "bike" => Ok(NetworkType::Bike),
            "drive" => Ok(NetworkType::Drive),
            other => Err(Error::InvalidData(format!(
                "Unknown network type '{other}', expected walk, bike or drive"
            ))),
        }
    }
}

impl TryFrom<String> for NetworkType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identifies one graph: a region name and a network type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphKey {
    pub region: Arc<str>,
    pub network: NetworkType,
}

impl GraphKey {
    pub fn new(region: &str, network: NetworkType) -> Self {
        Self {
            region: Arc::from(region),
            network,
        }
    }

    /// `Cox's Bazar` + `walk` -> `cox's_bazar_walk`
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            self.region.to_lowercase().replace(' ', "_"),
            self.network
        )
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.file_stem())
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Immutable road network of one region and network type.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    pub(crate) key: GraphKey,
    pub(crate) graph: DiGraph<RoadNode, RoadEdge>,
    pub(crate) node_lookup: HashMap<NodeId, NodeIndex>,
}

impl RoadGraph {
    pub(crate) fn new(
        key: GraphKey,
        graph: DiGraph<RoadNode, RoadEdge>,
        node_lookup: HashMap<NodeId, NodeIndex>,
    ) -> Self {
        Self {
            key,
            graph,
            node_lookup,
        }
    }

    pub fn key(&self) -> &GraphKey {
        &self.key
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.node_lookup
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_lookup.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.graph.node_weights()
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&RoadEdge> {
        self.graph.edge_weight(index)
    }

    /// Outgoing edges of `id` in graph-file order, as `(edge, target id, edge data)`.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = (EdgeIndex, NodeId, &RoadEdge)> {
        self.node_lookup
            .get(&id)
            .into_iter()
            .flat_map(move |&index| self.graph.edges(index))
            .map(move |edge| (edge.id(), self.graph[edge.target()].id, edge.weight()))
    }

    /// Every edge as `(edge, source id, target id, edge data)`.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, NodeId, NodeId, &RoadEdge)> {
        self.graph.edge_references().map(move |edge| {
            (
                edge.id(),
                self.graph[edge.source()].id,
                self.graph[edge.target()].id,
                edge.weight(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_type_is_case_insensitive() {
        assert_eq!("WALK".parse::<NetworkType>().unwrap(), NetworkType::Walk);
        assert_eq!(" Bike".parse::<NetworkType>().unwrap(), NetworkType::Bike);
        let parsed: NetworkType = serde_json::from_str("\"Drive\"").unwrap();
        assert_eq!(parsed, NetworkType::Drive);
        assert!("boat".parse::<NetworkType>().is_err());
    }

    #[test]
    fn file_name_follows_region_and_network() {
        let key = GraphKey::new("Dhaka", NetworkType::Walk);
        assert_eq!(key.file_name(), "dhaka_walk.json");

        let key = GraphKey::new("Chapai Nawabganj", NetworkType::Drive);
        assert_eq!(key.file_name(), "chapai_nawabganj_drive.json");
    }
}
