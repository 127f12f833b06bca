//! This module is responsible for loading road graphs and incident
//! snapshots from their external sources.

mod catalog;
pub mod graph_file;
mod incidents;
mod sources;

pub use catalog::GraphCatalog;
pub use graph_file::{EdgeRecord, GraphDocument, NodeRecord, build_road_graph};
pub use incidents::{FileIncidentSource, IncidentQuery, IncidentSource, MemoryIncidentStore};
pub use sources::{FileGraphSource, GraphSource, MemoryGraphSource};
