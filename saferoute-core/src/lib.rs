//! Safest-route engine.
//!
//! Loads regional road-network graphs on demand, weights every edge by the
//! severity and recency of nearby crime incidents, and runs an A* search
//! that trades accumulated risk against travelled distance.

pub mod clock;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod interrupt;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod risk;
pub mod routing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{IncidentFailurePolicy, RouterConfig, TimeWindow};
pub use error::Error;
pub use interrupt::{CancelToken, Interrupt, NeverCancel};
pub use loading::{
    FileGraphSource, FileIncidentSource, GraphCatalog, GraphSource, IncidentQuery,
    IncidentSource, MemoryGraphSource, MemoryIncidentStore,
};
pub use model::{
    GraphKey, Incident, NetworkType, Region, RegionCatalog, RoadEdge, RoadGraph, RoadNode,
    WorkingGraph,
};
pub use risk::{
    CachedWeight, EdgeWeightCache, EdgeWeightKey, IncidentIndex, RecencyBucket, RecencyBuckets,
    RiskModel, SeverityTable,
};
pub use routing::{
    Coordinate, CostModel, EdgeRisk, EdgeRisks, RouteInspection, RouteRequest, SafeRoute,
    SafeRouter,
};

/// Identifier of a road node as it appears in the graph files.
/// Unique within a region; regions share an id only for boundary nodes.
pub type NodeId = i64;

/// Distance along the surface of the Earth.
pub type Meters = f64;
