mod common;

use approx::assert_relative_eq;
use chrono::TimeDelta;
use saferoute_core::prelude::*;

use common::{fixture, grid, now, square, test_key, walk};

fn assert_edges_exist(router: &SafeRouter, route: &SafeRoute) {
    let graph = router.catalog().get(&test_key()).unwrap().unwrap();
    for pair in route.nodes.windows(2) {
        assert!(
            graph.outgoing(pair[0]).any(|(_, target, _)| target == pair[1]),
            "no edge {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn consecutive_route_nodes_are_adjacent_and_endpoints_are_snapped_nodes() {
    let f = fixture(grid(6, 6), RouterConfig::default());
    for (i, kind) in ["murder", "assault", "theft"].into_iter().enumerate() {
        let offset = i as f64 * 0.001;
        f.incidents
            .insert(Incident::new(0.0021 + offset, 0.0025, kind, now()));
    }

    // Slightly off the lattice so snapping matters.
    let route = f
        .router
        .find_safest_route(&walk((0.00002, -0.00003), (0.00498, 0.00501)))
        .unwrap();

    assert_edges_exist(&f.router, &route);
    assert_eq!(route.route.first(), Some(&Coordinate::new(0.0, 0.0)));
    assert_eq!(route.route.last(), Some(&Coordinate::new(0.005, 0.005)));
    assert_eq!(route.nodes.first(), Some(&1));
    assert_eq!(route.nodes.last(), Some(&36));
}

#[test]
fn repeated_requests_return_identical_routes() {
    let f = fixture(grid(5, 5), RouterConfig::default());
    f.incidents
        .insert(Incident::new(0.002, 0.0015, "robbery", now() - TimeDelta::days(10)));
    let request = walk((0.0, 0.0), (0.004, 0.004));

    let first = f.router.find_safest_route(&request).unwrap();
    let second = f.router.find_safest_route(&request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn same_node_request_repeats_the_node() {
    let f = fixture(square(), RouterConfig::default());
    let route = f
        .router
        .find_safest_route(&walk((0.0, 0.0), (0.00001, 0.00001)))
        .unwrap();
    assert_eq!(route.nodes, vec![1, 1]);
    assert_eq!(route.route, vec![Coordinate::new(0.0, 0.0); 2]);
}

#[test]
fn without_incidents_route_is_shortest() {
    let f = fixture(grid(4, 4), RouterConfig::default());
    let route = f
        .router
        .find_safest_route(&walk((0.0, 0.0), (0.003, 0.0)))
        .unwrap();

    // Straight up the first column.
    assert_eq!(route.nodes, vec![1, 5, 9, 13]);
    assert_eq!(route.risk, 0.0);
    assert_relative_eq!(route.cost, 1e-5 * route.length_meters, epsilon = 1e-12);
    assert_relative_eq!(route.length_meters, 3.0 * 111.195, epsilon = 1e-1);
}

#[test]
fn higher_severity_never_lowers_route_risk() {
    let request = walk((0.0, 0.0), (0.0, 0.001));
    let risk_for = |kind: &str, age_days: i64| {
        let f = fixture(square(), RouterConfig::default());
        f.incidents.insert(Incident::new(
            0.00005,
            0.0005,
            kind,
            now() - TimeDelta::days(age_days),
        ));
        f.router.find_safest_route(&request).unwrap().risk
    };

    let kinds = ["other", "theft", "harassment", "robbery", "assault", "kidnap", "rape", "murder"];
    for pair in kinds.windows(2) {
        assert!(risk_for(pair[0], 3) <= risk_for(pair[1], 3));
    }
    for ages in [0, 1, 7, 21, 42, 56, 100].windows(2) {
        assert!(risk_for("assault", ages[1]) <= risk_for("assault", ages[0]));
    }
}

#[test]
fn wider_buffer_picks_up_farther_incidents() {
    let request = walk((0.0, 0.0), (0.0, 0.001));
    let risk_with = |proximity_meters: f64| {
        let f = fixture(
            square(),
            RouterConfig {
                proximity_meters,
                ..RouterConfig::default()
            },
        );
        // ~44.5 m north of A->B
        f.incidents.insert(Incident::new(0.0004, 0.0005, "assault", now()));
        f.router.find_safest_route(&request).unwrap().risk
    };

    assert_eq!(risk_with(30.0), 0.0);
    assert_eq!(risk_with(50.0), 70.0);
}

#[test]
fn edge_weights_are_computed_once_within_ttl() {
    let f = fixture(square(), RouterConfig::default());
    let request = walk((0.0, 0.0), (0.001, 0.001));

    f.router.find_safest_route(&request).unwrap();
    let computed = f.router.cache().computations();
    assert_eq!(computed, 4);

    f.clock.advance(TimeDelta::minutes(29));
    f.router.find_safest_route(&request).unwrap();
    assert_eq!(f.router.cache().computations(), computed);

    f.clock.advance(TimeDelta::minutes(1));
    f.router.find_safest_route(&request).unwrap();
    assert_eq!(f.router.cache().computations(), 2 * computed);
}

#[test]
fn concurrent_requests_share_one_graph_and_agree() {
    let f = fixture(grid(5, 5), RouterConfig::default());
    f.incidents
        .insert(Incident::new(0.001, 0.0015, "murder", now()));
    let request = walk((0.0, 0.0), (0.004, 0.004));
    let expected = f.router.find_safest_route(&request).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| f.router.find_safest_route(&request).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
    assert_eq!(f.router.catalog().len(), 1);
}
