use geo::{LineString, Point};
use geojson::{Feature, Geometry};
use serde::{Deserialize, Serialize};

use crate::model::NetworkType;
use crate::{Error, Meters, NodeId};

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

/// Start, end and network of a routing call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(alias = "start_lat")]
    pub start_lat: f64,
    #[serde(alias = "start_lng")]
    pub start_lng: f64,
    #[serde(alias = "end_lat")]
    pub end_lat: f64,
    #[serde(alias = "end_lng")]
    pub end_lng: f64,
    #[serde(alias = "network_type")]
    pub network_type: NetworkType,
}

impl RouteRequest {
    pub fn new(start: Coordinate, end: Coordinate, network_type: NetworkType) -> Self {
        Self {
            start_lat: start.lat,
            start_lng: start.lng,
            end_lat: end.lat,
            end_lng: end.lng,
            network_type,
        }
    }

    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.start_lat, self.start_lng)
    }

    pub fn end(&self) -> Coordinate {
        Coordinate::new(self.end_lat, self.end_lng)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for coordinate in [self.start(), self.end()] {
            let Coordinate { lat, lng } = coordinate;
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(Error::InvalidData(format!(
                    "Coordinate out of range: lat {lat}, lng {lng}"
                )));
            }
        }
        Ok(())
    }
}

/// Chosen path, node by node from the snapped start to the snapped end.
///
/// Always holds at least two coordinates. A start and end that snap to the
/// same node give that node twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeRoute {
    pub route: Vec<Coordinate>,
    pub nodes: Vec<NodeId>,
    /// Search cost of the whole path
    pub cost: f64,
    /// Sum of edge risks along the path
    pub risk: f64,
    pub length_meters: Meters,
}

impl SafeRoute {
    pub fn start(&self) -> Option<Coordinate> {
        self.route.first().copied()
    }

    pub fn end(&self) -> Option<Coordinate> {
        self.route.last().copied()
    }

    pub fn line_string(&self) -> LineString<f64> {
        self.route.iter().map(|c| (c.lng, c.lat)).collect()
    }

    /// `LineString` feature with the route totals as properties.
    pub fn to_geojson(&self) -> Feature {
        let mut feature = Feature::from(Geometry::new((&self.line_string()).into()));
        feature.set_property("cost", self.cost);
        feature.set_property("risk", self.risk);
        feature.set_property("length_meters", self.length_meters);
        feature.set_property("nodes", self.nodes.clone());
        feature
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()).map_err(|e| Error::InvalidData(e.to_string()))
    }
}
