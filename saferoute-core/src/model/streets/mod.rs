//! Road network model

pub mod components;
pub mod network;
pub mod working;

pub use components::{RoadEdge, RoadNode};
pub use network::{GraphKey, NetworkType, RoadGraph};
pub use working::{EdgeKey, WorkingGraph};
