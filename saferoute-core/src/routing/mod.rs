//! Safest-route search and the request pipeline around it.

mod astar;
mod inspect;
mod planner;
mod route;
mod weights;

pub use astar::{CostModel, FoundPath, safest_path};
pub use inspect::{EdgeRisk, RouteInspection};
pub use planner::SafeRouter;
pub use route::{Coordinate, RouteRequest, SafeRoute};
pub use weights::EdgeRisks;
