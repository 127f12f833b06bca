//! Severity and recency scoring of incidents

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::geodesy::polyline_distance;
use crate::model::{Incident, RoadEdge};
use crate::{Error, Meters};

/// Lowercased incident type -> severity. Unknown types score `unknown`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSeverityTable")]
pub struct SeverityTable {
    weights: HashMap<String, f64>,
    unknown: f64,
}

#[derive(Deserialize)]
struct RawSeverityTable {
    weights: HashMap<String, f64>,
    #[serde(default = "default_unknown_severity")]
    unknown: f64,
}

fn default_unknown_severity() -> f64 {
    1.0
}

impl From<RawSeverityTable> for SeverityTable {
    fn from(raw: RawSeverityTable) -> Self {
        SeverityTable::new(raw.weights, raw.unknown)
    }
}

impl Default for SeverityTable {
    fn default() -> Self {
        let weights = [
            ("murder", 10.0),
            ("rape", 9.0),
            ("kidnap", 8.0),
            ("assault", 7.0),
            ("robbery", 6.0),
            ("harassment", 5.0),
            ("theft", 3.0),
            ("other", 1.0),
        ]
        .into_iter()
        .map(|(kind, weight)| (kind.to_string(), weight))
        .collect();

        SeverityTable::new(weights, default_unknown_severity())
    }
}

impl SeverityTable {
    pub fn new(weights: HashMap<String, f64>, unknown: f64) -> Self {
        Self {
            weights: weights
                .into_iter()
                .map(|(kind, weight)| (kind.to_lowercase(), weight))
                .collect(),
            unknown,
        }
    }

    pub fn severity(&self, kind: &str) -> f64 {
        self.weights
            .get(kind.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(self.unknown)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        let negative = self
            .weights
            .iter()
            .map(|(kind, weight)| (kind.as_str(), *weight))
            .chain(std::iter::once(("<unknown>", self.unknown)))
            .find(|(_, weight)| !weight.is_finite() || *weight < 0.0);

        match negative {
            Some((kind, weight)) => Err(Error::InvalidConfig(format!(
                "severity of '{kind}' must be a non-negative number, got {weight}"
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RecencyBucket {
    /// Exclusive upper bound on the whole-day age
    pub below_days: i64,
    pub score: f64,
}

/// Step function of incident age in whole days.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecencyBuckets {
    pub buckets: Vec<RecencyBucket>,
    /// Score for incidents older than every bucket
    pub otherwise: f64,
}

impl Default for RecencyBuckets {
    fn default() -> Self {
        let buckets = [(1, 10.0), (7, 8.0), (21, 6.0), (42, 4.0), (56, 2.0)]
            .into_iter()
            .map(|(below_days, score)| RecencyBucket { below_days, score })
            .collect();
        Self {
            buckets,
            otherwise: 1.0,
        }
    }
}

impl RecencyBuckets {
    /// Future-dated incidents (negative age) count as age zero.
    pub fn score(&self, age_days: i64) -> f64 {
        let age_days = age_days.max(0);
        self.buckets
            .iter()
            .find(|bucket| age_days < bucket.below_days)
            .map_or(self.otherwise, |bucket| bucket.score)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self
            .buckets
            .windows(2)
            .any(|pair| pair[0].below_days >= pair[1].below_days)
        {
            return Err(Error::InvalidConfig(
                "recency buckets must have strictly increasing bounds".to_string(),
            ));
        }
        let scores = self.buckets.iter().map(|b| b.score);
        if scores
            .chain(std::iter::once(self.otherwise))
            .any(|score| !score.is_finite() || score < 0.0)
        {
            return Err(Error::InvalidConfig(
                "recency scores must be non-negative numbers".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scores incidents and tests their proximity to edges.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskModel {
    pub severity: SeverityTable,
    pub recency: RecencyBuckets,
    pub proximity_meters: Meters,
}

impl RiskModel {
    pub fn new(severity: SeverityTable, recency: RecencyBuckets, proximity_meters: Meters) -> Self {
        Self {
            severity,
            recency,
            proximity_meters,
        }
    }

    /// Whole days between the incident and `now`, truncated toward zero.
    pub fn age_days(incident: &Incident, now: DateTime<Utc>) -> i64 {
        (now - incident.timestamp).num_days()
    }

    /// `severity(type) * recency(age)`
    pub fn incident_score(&self, incident: &Incident, now: DateTime<Utc>) -> f64 {
        self.severity.severity(&incident.kind) * self.recency.score(Self::age_days(incident, now))
    }

    pub fn is_near(&self, incident: &Incident, edge: &RoadEdge) -> bool {
        polyline_distance(incident.location, &edge.geometry) <= self.proximity_meters
    }

    /// Edge risk by scanning every incident. `IncidentIndex` gives the same
    /// sum with a spatial prefilter.
    pub fn edge_risk(&self, edge: &RoadEdge, incidents: &[Incident], now: DateTime<Utc>) -> f64 {
        incidents
            .iter()
            .filter(|incident| self.is_near(incident, edge))
            .map(|incident| self.incident_score(incident, now))
            .sum()
    }
}
