//! Crime incidents as consumed by the risk scorer

use chrono::{DateTime, NaiveDateTime, Utc};
use geo::Point;
use serde::{Deserialize, Deserializer};

/// A reported incident. Carries no identity; equal values score equally.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "IncidentRecord")]
pub struct Incident {
    /// `x` = longitude, `y` = latitude
    pub location: Point<f64>,
    /// Incident type as reported, compared case-insensitively
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl Incident {
    pub fn new(lat: f64, lng: f64, kind: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            location: Point::new(lng, lat),
            kind: kind.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct RecordLocation {
    lat: f64,
    lng: f64,
}

/// Wire shape of an incident: `{location: {lat, lng}, type, timestamp}`.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IncidentRecord {
    location: RecordLocation,
    #[serde(rename = "type")]
    kind: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: DateTime<Utc>,
}

impl From<IncidentRecord> for Incident {
    fn from(record: IncidentRecord) -> Self {
        Incident::new(
            record.location.lat,
            record.location.lng,
            record.kind,
            record.timestamp,
        )
    }
}

/// Flat CSV row: `lat,lng,type,timestamp`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IncidentRow {
    lat: f64,
    lng: f64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: DateTime<Utc>,
}

impl From<IncidentRow> for Incident {
    fn from(row: IncidentRow) -> Self {
        Incident::new(row.lat, row.lng, row.kind, row.timestamp)
    }
}

/// Accepts RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_and_ignores_extra_fields() {
        let incident: Incident = serde_json::from_str(
            r#"{"id": "abc", "reporter": "someone", "description": "x",
                "location": {"lat": 23.75, "lng": 90.39},
                "type": "Robbery", "timestamp": "2025-01-02T03:04:05"}"#,
        )
        .unwrap();

        assert_eq!(incident.location, Point::new(90.39, 23.75));
        assert_eq!(incident.kind, "Robbery");
        assert_eq!(incident.timestamp.to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }

    #[test]
    fn timestamps_with_offsets_are_normalized() {
        let ts = parse_timestamp("2025-01-02T09:04:05+06:00").unwrap();
        assert_eq!(ts, parse_timestamp("2025-01-02 03:04:05").unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
