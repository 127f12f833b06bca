#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use saferoute_core::loading::GraphDocument;
use saferoute_core::prelude::*;
use saferoute_core::{GraphKey, ManualClock};

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000, 0).unwrap()
}

/// Square A(1)=(0,0), B(2)=(0,0.001), C(3)=(0.001,0.001), D(4)=(0.001,0)
/// with edges A->B, B->C, A->D, D->C.
pub fn square() -> GraphDocument {
    let mut document = GraphDocument::default();
    document
        .add_node(1, 0.0, 0.0)
        .add_node(2, 0.0, 0.001)
        .add_node(3, 0.001, 0.001)
        .add_node(4, 0.001, 0.0)
        .add_straight_edge(1, 2)
        .add_straight_edge(2, 3)
        .add_straight_edge(1, 4)
        .add_straight_edge(4, 3);
    document
}

/// `rows` x `cols` lattice with 0.001 degree spacing and edges both ways.
/// Node ids are `row * cols + col + 1`.
pub fn grid(rows: i64, cols: i64) -> GraphDocument {
    let id = |row: i64, col: i64| row * cols + col + 1;
    let mut document = GraphDocument::default();
    for row in 0..rows {
        for col in 0..cols {
            document.add_node(id(row, col), row as f64 * 0.001, col as f64 * 0.001);
        }
    }
    for row in 0..rows {
        for col in 0..cols {
            if col + 1 < cols {
                document
                    .add_straight_edge(id(row, col), id(row, col + 1))
                    .add_straight_edge(id(row, col + 1), id(row, col));
            }
            if row + 1 < rows {
                document
                    .add_straight_edge(id(row, col), id(row + 1, col))
                    .add_straight_edge(id(row + 1, col), id(row, col));
            }
        }
    }
    document
}

pub fn test_region() -> Region {
    Region::new("Test", -0.05, -0.05, 0.05, 0.05)
}

pub fn test_key() -> GraphKey {
    GraphKey::new("Test", NetworkType::Walk)
}

pub struct Fixture {
    pub router: SafeRouter,
    pub incidents: Arc<MemoryIncidentStore>,
    pub clock: Arc<ManualClock>,
}

pub fn fixture(document: GraphDocument, config: RouterConfig) -> Fixture {
    fixture_with(
        MemoryGraphSource::new().with(test_key(), document),
        vec![test_region()],
        config,
    )
}

pub fn fixture_with(graphs: MemoryGraphSource, regions: Vec<Region>, config: RouterConfig) -> Fixture {
    let incidents = Arc::new(MemoryIncidentStore::new());
    let clock = Arc::new(ManualClock::new(now()));
    let router = SafeRouter::new(config, graphs, Arc::clone(&incidents))
        .unwrap()
        .with_regions(RegionCatalog::new(regions))
        .with_clock(Arc::clone(&clock));
    Fixture {
        router,
        incidents,
        clock,
    }
}

pub fn walk(start: (f64, f64), end: (f64, f64)) -> RouteRequest {
    RouteRequest::new(
        Coordinate::new(start.0, start.1),
        Coordinate::new(end.0, end.1),
        NetworkType::Walk,
    )
}
