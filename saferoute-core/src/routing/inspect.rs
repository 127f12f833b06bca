//! Diagnostics for "why did the route go there?"

use serde::Serialize;

use super::planner::SafeRouter;
use super::route::{Coordinate, RouteRequest, SafeRoute};
use crate::geodesy::polyline_distance;
use crate::interrupt::{Interrupt, NeverCancel};
use crate::{Error, Meters, NodeId};

/// Risk carried by one edge of the chosen route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRisk {
    pub from: NodeId,
    pub to: NodeId,
    pub risk: f64,
    pub length_meters: Meters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInspection {
    /// Whether the point is inside the proximity buffer of any route edge
    pub on_route: bool,
    /// Distance from the point to the closest route edge, if the route has edges
    pub nearest_edge_meters: Option<Meters>,
    pub route: SafeRoute,
    pub edge_risks: Vec<EdgeRisk>,
}

impl SafeRouter {
    /// Plans `request` and reports how a hypothetical incident at `point`
    /// relates to the chosen route.
    pub fn inspect_incident(
        &self,
        request: &RouteRequest,
        point: Coordinate,
    ) -> Result<RouteInspection, Error> {
        self.inspect_incident_with(request, point, &NeverCancel)
    }

    pub fn inspect_incident_with(
        &self,
        request: &RouteRequest,
        point: Coordinate,
        interrupt: &dyn Interrupt,
    ) -> Result<RouteInspection, Error> {
        let plan = self.plan(request, interrupt)?;
        let location = point.point();

        let mut edge_risks = Vec::with_capacity(plan.path.edges.len());
        let mut nearest: Option<Meters> = None;
        for (step, &edge) in plan.path.edges.iter().enumerate() {
            let Some(data) = plan.graph.edge(edge) else {
                continue;
            };
            let distance = polyline_distance(location, &data.geometry);
            nearest = Some(nearest.map_or(distance, |best| best.min(distance)));

            edge_risks.push(EdgeRisk {
                from: plan.path.nodes[step],
                to: plan.path.nodes[step + 1],
                risk: plan.risks.risk(edge),
                length_meters: data.length,
            });
        }

        Ok(RouteInspection {
            on_route: nearest.is_some_and(|d| d <= self.config().proximity_meters),
            nearest_edge_meters: nearest,
            route: plan.route,
            edge_risks,
        })
    }
}
