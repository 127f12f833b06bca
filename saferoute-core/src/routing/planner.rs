//! Request pipeline: locate, load, weight, snap, search

use chrono::{DateTime, Utc};
use geo::Point;
use log::{debug, info, warn};

use super::astar::{CostModel, FoundPath, safest_path};
use super::route::{Coordinate, RouteRequest, SafeRoute};
use super::weights::EdgeRisks;
use crate::clock::{Clock, SystemClock};
use crate::config::{IncidentFailurePolicy, RouterConfig};
use crate::geodesy::{haversine, padded_bbox};
use crate::interrupt::{Interrupt, NeverCancel};
use crate::loading::{GraphCatalog, GraphSource, IncidentQuery, IncidentSource};
use crate::model::{GraphKey, Incident, NetworkType, RegionCatalog, WorkingGraph};
use crate::risk::{EdgeWeightCache, IncidentIndex, RiskModel};
use crate::{Error, NodeId};

/// Safest-route engine.
///
/// Holds the process-wide state shared by concurrent requests: the graph
/// catalog and the edge-weight cache. Everything else is request-local.
pub struct SafeRouter {
    config: RouterConfig,
    model: RiskModel,
    regions: RegionCatalog,
    catalog: GraphCatalog,
    incidents: Box<dyn IncidentSource>,
    cache: EdgeWeightCache,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for SafeRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeRouter")
            .field("config", &self.config)
            .field("regions", &self.regions.len())
            .field("catalog", &self.catalog)
            .field("cached_weights", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Everything a finished search produced, kept for diagnostics.
pub(crate) struct Plan {
    pub(crate) graph: WorkingGraph,
    pub(crate) risks: EdgeRisks,
    pub(crate) path: FoundPath,
    pub(crate) route: SafeRoute,
}

impl SafeRouter {
    /// Router over the Bangladesh district catalog and the system clock.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when `config` fails validation.
    pub fn new(
        config: RouterConfig,
        graphs: impl GraphSource + 'static,
        incidents: impl IncidentSource + 'static,
    ) -> Result<Self, Error> {
        config.validate()?;

        let model = RiskModel::new(
            config.severity_table.clone(),
            config.recency_buckets.clone(),
            config.proximity_meters,
        );
        let cache = EdgeWeightCache::new(config.cache_ttl());

        Ok(Self {
            config,
            model,
            regions: RegionCatalog::bangladesh_districts(),
            catalog: GraphCatalog::new(graphs),
            incidents: Box::new(incidents),
            cache,
            clock: Box::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_regions(mut self, regions: RegionCatalog) -> Self {
        self.regions = regions;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn risk_model(&self) -> &RiskModel {
        &self.model
    }

    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    pub fn catalog(&self) -> &GraphCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &EdgeWeightCache {
        &self.cache
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Drops cached weights that outlived the TTL and returns how many went.
    pub fn purge_expired_weights(&self) -> usize {
        let removed = self.cache.purge_expired(self.clock.now_millis());
        if removed > 0 {
            debug!("Purged {removed} expired edge weights");
        }
        removed
    }

    /// # Errors
    ///
    /// `NoRegion`, `GraphLoad`, `NoRoadNearby`, `NoPath`, `InvalidData` for
    /// out-of-range coordinates, and `IncidentSourceUnavailable` when the
    /// failure policy is `fail`.
    pub fn find_safest_route(&self, request: &RouteRequest) -> Result<SafeRoute, Error> {
        self.find_safest_route_with(request, &NeverCancel)
    }

    /// As [`Self::find_safest_route`], returning `Cancelled` once `interrupt` fires.
    pub fn find_safest_route_with(
        &self,
        request: &RouteRequest,
        interrupt: &dyn Interrupt,
    ) -> Result<SafeRoute, Error> {
        Ok(self.plan(request, interrupt)?.route)
    }

    pub(crate) fn plan(
        &self,
        request: &RouteRequest,
        interrupt: &dyn Interrupt,
    ) -> Result<Plan, Error> {
        request.validate()?;
        let start = request.start().point();
        let end = request.end().point();

        let graph = self.working_graph(start, end, request.network_type, interrupt)?;

        let now = self.clock.now();
        let incidents = self.fetch_incidents(start, end, now, interrupt)?;
        interrupt.check()?;

        let index = IncidentIndex::build(&self.model, &incidents, now);
        let risks = EdgeRisks::compute(&graph, &index, &self.cache, now.timestamp_millis());
        debug!(
            "Weighted {} edges against {} incidents",
            graph.edge_count(),
            index.len()
        );
        interrupt.check()?;

        let from = self.snap(&graph, request.start())?;
        let to = self.snap(&graph, request.end())?;

        let path = safest_path(&graph, &risks, self.costs(), from, to, interrupt)?;
        let route = materialize(&graph, &risks, &path)?;

        Ok(Plan {
            graph,
            risks,
            path,
            route,
        })
    }

    fn costs(&self) -> CostModel {
        CostModel::new(self.config.alpha, self.config.beta)
    }

    fn working_graph(
        &self,
        start: Point<f64>,
        end: Point<f64>,
        network: NetworkType,
        interrupt: &dyn Interrupt,
    ) -> Result<WorkingGraph, Error> {
        let locate = |point: Point<f64>| {
            self.regions.find_region(point).ok_or(Error::NoRegion {
                lat: point.y(),
                lng: point.x(),
            })
        };
        let start_region = locate(start)?;
        let end_region = locate(end)?;
        interrupt.check()?;

        let first = self
            .catalog
            .get_or_load(&GraphKey::new(&start_region.name, network), interrupt)?;
        if start_region.name == end_region.name {
            return Ok(WorkingGraph::single(first));
        }

        let second = self
            .catalog
            .get_or_load(&GraphKey::new(&end_region.name, network), interrupt)?;
        info!(
            "Cross-region request, merging graphs {} and {}",
            first.key(),
            second.key()
        );
        Ok(WorkingGraph::merged(vec![first, second]))
    }

    fn fetch_incidents(
        &self,
        start: Point<f64>,
        end: Point<f64>,
        now: DateTime<Utc>,
        interrupt: &dyn Interrupt,
    ) -> Result<Vec<Incident>, Error> {
        let bounds = padded_bbox(start, end, self.config.incident_bbox_pad_deg);
        let mut query = IncidentQuery::within(bounds);
        if let Some(window) = self.config.incident_time_window {
            let (from, to) = window.around(now);
            query = query.between(from, to);
        }

        match self.incidents.incidents(&query, interrupt) {
            Err(Error::IncidentSourceUnavailable(reason))
                if self.config.incident_failure == IncidentFailurePolicy::Degrade =>
            {
                warn!("Routing without incidents, source unavailable: {reason}");
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// Nearest node by great-circle distance. Ties go to the node seen first.
    fn snap(&self, graph: &WorkingGraph, target: Coordinate) -> Result<NodeId, Error> {
        let point = target.point();
        let max_distance = self
            .config
            .max_snap_distance_meters
            .unwrap_or(f64::INFINITY);

        graph
            .nodes()
            .map(|node| (node.id, haversine(node.geometry, point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|&(_, distance)| distance <= max_distance)
            .map(|(id, _)| id)
            .ok_or(Error::NoRoadNearby {
                lat: target.lat,
                lng: target.lng,
                max_distance,
            })
    }
}

fn materialize(graph: &WorkingGraph, risks: &EdgeRisks, path: &FoundPath) -> Result<SafeRoute, Error> {
    let nodes = match path.nodes.as_slice() {
        [only] => vec![*only, *only],
        _ => path.nodes.clone(),
    };

    let route = nodes
        .iter()
        .map(|&id| {
            graph
                .node(id)
                .map(|node| Coordinate::from(node.geometry))
                .ok_or(Error::UnrecoverableError("path node missing from working graph"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (risk, length_meters) = path
        .edges
        .iter()
        .filter_map(|&edge| graph.edge(edge).map(|data| (risks.risk(edge), data.length)))
        .fold((0.0, 0.0), |(risk, length), (edge_risk, edge_length)| {
            (risk + edge_risk, length + edge_length)
        });

    Ok(SafeRoute {
        route,
        nodes,
        cost: path.cost,
        risk,
        length_meters,
    })
}
