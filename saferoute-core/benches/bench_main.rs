use std::hint::black_box;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use saferoute_core::loading::GraphDocument;
use saferoute_core::prelude::*;
use saferoute_core::{GraphKey, ManualClock};

const SIDE: i64 = 60;
const SPACING: f64 = 0.0005;

fn lattice() -> GraphDocument {
    let id = |row: i64, col: i64| row * SIDE + col + 1;
    let mut document = GraphDocument::default();
    for row in 0..SIDE {
        for col in 0..SIDE {
            document.add_node(id(row, col), row as f64 * SPACING, col as f64 * SPACING);
        }
    }
    for row in 0..SIDE {
        for col in 0..SIDE {
            if col + 1 < SIDE {
                document
                    .add_straight_edge(id(row, col), id(row, col + 1))
                    .add_straight_edge(id(row, col + 1), id(row, col));
            }
            if row + 1 < SIDE {
                document
                    .add_straight_edge(id(row, col), id(row + 1, col))
                    .add_straight_edge(id(row + 1, col), id(row, col));
            }
        }
    }
    document
}

fn incidents(now: DateTime<Utc>) -> Vec<Incident> {
    let kinds = ["murder", "robbery", "theft", "assault", "harassment"];
    let extent = SIDE as f64 * SPACING;
    (0..2_000i64)
        .map(|i| {
            let f = i as f64;
            Incident::new(
                (f * 0.618_034).fract() * extent,
                (f * 0.414_214).fract() * extent,
                kinds[(i % 5) as usize],
                now - TimeDelta::hours(i % 1_500),
            )
        })
        .collect()
}

fn router(ttl_seconds: u64) -> SafeRouter {
    let now = DateTime::from_timestamp(1_750_000_000, 0).unwrap_or_default();
    let graphs = MemoryGraphSource::new().with(GraphKey::new("Bench", NetworkType::Walk), lattice());
    let store = Arc::new(MemoryIncidentStore::from_incidents(incidents(now)));
    let config = RouterConfig {
        cache_ttl_seconds: ttl_seconds,
        ..RouterConfig::default()
    };

    SafeRouter::new(config, graphs, store)
        .expect("Router must be created")
        .with_regions(RegionCatalog::new(vec![Region::new(
            "Bench", -0.01, -0.01, 0.05, 0.05,
        )]))
        .with_clock(ManualClock::new(now))
}

fn routing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("safest_route");
    group.sample_size(20);

    let far = (SIDE - 1) as f64 * SPACING;
    let request = RouteRequest::new(
        Coordinate::new(0.0, 0.0),
        Coordinate::new(far, far),
        NetworkType::Walk,
    );

    let warm = router(1800);
    warm.find_safest_route(&request).expect("Route must be found");
    group.bench_function("cached weights", |b| {
        b.iter(|| warm.find_safest_route(black_box(&request)).expect("Route must be found"))
    });

    // A zero TTL rescores every edge on each call.
    let cold = router(0);
    cold.find_safest_route(&request).expect("Route must be found");
    group.bench_function("rescored weights", |b| {
        b.iter(|| cold.find_safest_route(black_box(&request)).expect("Route must be found"))
    });

    group.finish();
}

criterion_group!(benches, routing_benchmark);
criterion_main!(benches);
