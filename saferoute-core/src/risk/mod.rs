//! Incident scoring and edge risk weighting

mod cache;
mod index;
mod scoring;

pub use cache::{CachedWeight, EdgeWeightCache, EdgeWeightKey};
pub use index::IncidentIndex;
pub use scoring::{RecencyBucket, RecencyBuckets, RiskModel, SeverityTable};
