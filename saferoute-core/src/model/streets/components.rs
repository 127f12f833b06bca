//! Street network components - nodes and edges

use geo::{LineString, Point};

use crate::{Meters, NodeId};

/// Road graph node
#[derive(Debug, Clone, PartialEq)]
pub struct RoadNode {
    /// Identifier from the graph file
    pub id: NodeId,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Directed road segment
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    /// Polyline from the source node to the target node, at least two vertices
    pub geometry: LineString<f64>,
    /// Physical length along the polyline
    pub length: Meters,
}
