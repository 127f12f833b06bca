use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No region covers point (lat {lat}, lng {lng})")]
    NoRegion { lat: f64, lng: f64 },
    #[error("Failed to load graph '{key}': {reason}")]
    GraphLoad { key: String, reason: String },
    #[error("No road node within {max_distance:.1} m of (lat {lat}, lng {lng})")]
    NoRoadNearby {
        lat: f64,
        lng: f64,
        max_distance: f64,
    },
    #[error("No path from node {from} to node {to}")]
    NoPath { from: NodeId, to: NodeId },
    #[error("Incident source unavailable: {0}")]
    IncidentSourceUnavailable(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Unrecoverable error: {0}")]
    UnrecoverableError(&'static str),
}
