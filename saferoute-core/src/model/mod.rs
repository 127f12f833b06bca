//! Data model for safest-route planning
//!
//! Contains the road network, the region catalog and crime incidents.

pub mod incident;
pub mod region;
pub mod streets;

pub use incident::Incident;
pub use region::{Region, RegionCatalog};
pub use streets::{
    EdgeKey, GraphKey, NetworkType, RoadEdge, RoadGraph, RoadNode, WorkingGraph,
};
