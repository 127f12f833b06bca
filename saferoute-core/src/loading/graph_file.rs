//! Graph file format and conversion into a `RoadGraph`

use geo::{Coord, LineString};
use hashbrown::HashMap;
use log::{debug, info, warn};
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};

use crate::geodesy::polyline_length;
use crate::model::{GraphKey, RoadEdge, RoadGraph, RoadNode};
use crate::NodeId;

/// Contents of a `<region>_<network>.json` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    /// `[lat, lng]` pairs from `from` to `to`
    pub geometry: Vec<[f64; 2]>,
    /// Length in meters; computed from the geometry when absent or zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl GraphDocument {
    pub fn add_node(&mut self, id: NodeId, lat: f64, lng: f64) -> &mut Self {
        self.nodes.push(NodeRecord { id, lat, lng });
        self
    }

    /// Adds a straight edge whose geometry runs between the two node positions.
    /// Both nodes must already be present.
    pub fn add_straight_edge(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        let position = |id: NodeId| {
            self.nodes
                .iter()
                .find(|node| node.id == id)
                .map(|node| [node.lat, node.lng])
        };
        if let (Some(a), Some(b)) = (position(from), position(to)) {
            self.edges.push(EdgeRecord {
                from,
                to,
                geometry: vec![a, b],
                length: None,
            });
        }
        self
    }
}

/// Builds the adjacency structure for one key.
///
/// Edges whose endpoints are missing from the node table, or whose geometry
/// has fewer than two vertices, are skipped and counted.
pub fn build_road_graph(key: GraphKey, document: GraphDocument) -> RoadGraph {
    let mut graph = DiGraph::with_capacity(document.nodes.len(), document.edges.len());
    let mut node_lookup = HashMap::with_capacity(document.nodes.len());

    for record in document.nodes {
        if node_lookup.contains_key(&record.id) {
            warn!("Graph {key}: duplicate node id {}, keeping the first", record.id);
            continue;
        }
        let index = graph.add_node(RoadNode {
            id: record.id,
            geometry: geo::Point::new(record.lng, record.lat),
        });
        node_lookup.insert(record.id, index);
    }

    let mut skipped = 0usize;
    let mut accepted = Vec::with_capacity(document.edges.len());
    for record in document.edges {
        let (Some(&from), Some(&to)) = (node_lookup.get(&record.from), node_lookup.get(&record.to))
        else {
            debug!(
                "Graph {key}: edge {} -> {} references a missing node",
                record.from, record.to
            );
            skipped += 1;
            continue;
        };
        if record.geometry.len() < 2 {
            debug!(
                "Graph {key}: edge {} -> {} has fewer than two vertices",
                record.from, record.to
            );
            skipped += 1;
            continue;
        }

        let geometry: LineString<f64> = record
            .geometry
            .iter()
            .map(|&[lat, lng]| Coord { x: lng, y: lat })
            .collect();
        let length = match record.length {
            Some(length) if length > 0.0 => length,
            _ => polyline_length(&geometry),
        };

        accepted.push((from, to, RoadEdge { geometry, length }));
    }

    // petgraph lists outgoing edges newest first; inserting in reverse keeps
    // each node's adjacency in file order.
    for (from, to, edge) in accepted.into_iter().rev() {
        graph.add_edge(from, to, edge);
    }

    if skipped > 0 {
        warn!("Graph {key}: skipped {skipped} edges with missing endpoints or geometry");
    }
    info!(
        "Graph {key}: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    RoadGraph::new(key, graph, node_lookup)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geodesy::haversine;
    use crate::model::NetworkType;

    fn key() -> GraphKey {
        GraphKey::new("Dhaka", NetworkType::Walk)
    }

    #[test]
    fn skips_edges_with_unknown_endpoints() {
        let document: GraphDocument = serde_json::from_str(
            r#"{
                "nodes": [{"id": 1, "lat": 23.7, "lng": 90.4}, {"id": 2, "lat": 23.7001, "lng": 90.4001}],
                "edges": [
                    {"from": 1, "to": 2, "geometry": [[23.7, 90.4], [23.7001, 90.4001]]},
                    {"from": 1, "to": 99, "geometry": [[23.7, 90.4], [23.8, 90.5]]}
                ]
            }"#,
        )
        .unwrap();

        let graph = build_road_graph(key(), document);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let (_, target, edge) = graph.outgoing(1).next().unwrap();
        assert_eq!(target, 2);
        assert_relative_eq!(
            edge.length,
            haversine(geo::Point::new(90.4, 23.7), geo::Point::new(90.4001, 23.7001)),
            epsilon = 1e-9
        );
    }

    #[test]
    fn outgoing_edges_keep_file_order() {
        let mut document = GraphDocument::default();
        document
            .add_node(1, 0.0, 0.0)
            .add_node(2, 0.0, 0.001)
            .add_node(3, 0.001, 0.0)
            .add_node(4, 0.001, 0.001)
            .add_straight_edge(1, 2)
            .add_straight_edge(1, 3)
            .add_straight_edge(1, 4);

        let graph = build_road_graph(key(), document);
        let targets: Vec<_> = graph.outgoing(1).map(|(_, target, _)| target).collect();
        assert_eq!(targets, vec![2, 3, 4]);
    }

    #[test]
    fn supplied_length_is_kept_and_parallel_edges_survive() {
        let mut document = GraphDocument::default();
        document.add_node(1, 0.0, 0.0).add_node(2, 0.0, 0.001);
        document.edges.push(EdgeRecord {
            from: 1,
            to: 2,
            geometry: vec![[0.0, 0.0], [0.0005, 0.0005], [0.0, 0.001]],
            length: Some(250.0),
        });
        document.add_straight_edge(1, 2);

        let graph = build_road_graph(key(), document);
        let lengths: Vec<_> = graph.outgoing(1).map(|(_, _, edge)| edge.length).collect();
        assert_eq!(lengths.len(), 2);
        assert_eq!(lengths[0], 250.0);
        assert_relative_eq!(lengths[1], 111.195, epsilon = 1e-2);
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let parsed = serde_json::from_str::<GraphDocument>(
            r#"{"nodes": [{"id": 1, "lat": 0.0}], "edges": []}"#,
        );
        assert!(parsed.is_err());
    }
}
