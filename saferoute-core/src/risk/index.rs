//! Spatial index over one request's incident snapshot

use chrono::{DateTime, Utc};
use geo::{BoundingRect, Point};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use super::RiskModel;
use crate::geodesy::{meters_to_degrees, polyline_distance};
use crate::model::{Incident, RoadEdge};
use crate::Meters;

/// Incident position (`[lng, lat]`) tagged with its precomputed score.
type ScoredIncident = GeomWithData<[f64; 2], f64>;

/// Incidents of a single request, scored once at build time.
///
/// The R-tree only narrows candidates to the edge envelope grown by the
/// proximity buffer; membership is decided by the exact polyline distance.
#[derive(Debug)]
pub struct IncidentIndex {
    tree: RTree<ScoredIncident>,
    proximity_meters: Meters,
}

impl IncidentIndex {
    pub fn build(model: &RiskModel, incidents: &[Incident], now: DateTime<Utc>) -> Self {
        let scored = incidents
            .iter()
            .map(|incident| {
                ScoredIncident::new(
                    [incident.location.x(), incident.location.y()],
                    model.incident_score(incident, now),
                )
            })
            .collect();

        Self {
            tree: RTree::bulk_load(scored),
            proximity_meters: model.proximity_meters,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Sum of scores of incidents within the proximity buffer of `edge`.
    pub fn edge_risk(&self, edge: &RoadEdge) -> f64 {
        let Some(bounds) = edge.geometry.bounding_rect() else {
            return 0.0;
        };
        if self.is_empty() {
            return 0.0;
        }

        let widest_lat = bounds.min().y.abs().max(bounds.max().y.abs());
        // Oversized a little; the exact distance test below decides.
        let (d_lng, d_lat) = meters_to_degrees(self.proximity_meters * 1.01, widest_lat);
        let envelope = AABB::from_corners(
            [bounds.min().x - d_lng, bounds.min().y - d_lat],
            [bounds.max().x + d_lng, bounds.max().y + d_lat],
        );

        self.tree
            .locate_in_envelope(&envelope)
            .filter(|candidate| {
                let [lng, lat] = *candidate.geom();
                polyline_distance(Point::new(lng, lat), &edge.geometry) <= self.proximity_meters
            })
            .map(|candidate| candidate.data)
            .sum()
    }
}
