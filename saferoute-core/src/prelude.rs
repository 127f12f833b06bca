// Re-export key components
pub use crate::config::{IncidentFailurePolicy, RouterConfig, TimeWindow};
pub use crate::interrupt::{CancelToken, Interrupt, NeverCancel};
pub use crate::loading::{
    FileGraphSource, FileIncidentSource, MemoryGraphSource, MemoryIncidentStore,
};
pub use crate::model::{Incident, NetworkType, Region, RegionCatalog};
pub use crate::routing::{Coordinate, RouteInspection, RouteRequest, SafeRoute, SafeRouter};

// Core scalar types
pub use crate::Error;
pub use crate::Meters;
pub use crate::NodeId;
