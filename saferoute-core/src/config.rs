//! Router configuration knobs.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::Error;
use crate::risk::{RecencyBuckets, SeverityTable};

/// Incident time filter relative to the request time.
/// Incidents are kept when `now - before <= t <= now + after`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimeWindow {
    pub before_seconds: i64,
    pub after_seconds: i64,
}

impl TimeWindow {
    /// Saturates on overflow; `RouterConfig::validate` rejects the result.
    pub fn hours(before: i64, after: i64) -> Self {
        Self {
            before_seconds: before.saturating_mul(3600),
            after_seconds: after.saturating_mul(3600),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        for (name, seconds) in [
            ("before_seconds", self.before_seconds),
            ("after_seconds", self.after_seconds),
        ] {
            if seconds < 0 || TimeDelta::try_seconds(seconds).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "incident_time_window.{name} out of range, got {seconds}"
                )));
            }
        }
        Ok(())
    }

    /// Bounds past the representable range clamp to the earliest or latest instant.
    pub fn around(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = TimeDelta::try_seconds(self.before_seconds)
            .and_then(|delta| now.checked_sub_signed(delta))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let to = TimeDelta::try_seconds(self.after_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (from, to)
    }
}

/// What to do when the incident store cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentFailurePolicy {
    /// Route with an empty incident set and log the failure.
    #[default]
    Degrade,
    /// Surface `IncidentSourceUnavailable` to the caller.
    Fail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Weight of accumulated risk in the edge cost.
    pub alpha: f64,
    /// Weight of distance in the edge cost, per meter.
    pub beta: f64,
    /// Incident-to-edge buffer in meters.
    pub proximity_meters: f64,
    pub cache_ttl_seconds: u64,
    /// Padding around the endpoints when fetching incidents.
    pub incident_bbox_pad_deg: f64,
    pub incident_time_window: Option<TimeWindow>,
    pub severity_table: SeverityTable,
    pub recency_buckets: RecencyBuckets,
    pub incident_failure: IncidentFailurePolicy,
    /// Snapping further than this fails with `NoRoadNearby`. Unbounded when absent.
    pub max_snap_distance_meters: Option<f64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            alpha: 10_000.0,
            beta: 1e-5,
            proximity_meters: 30.0,
            cache_ttl_seconds: 1800,
            incident_bbox_pad_deg: 0.1,
            incident_time_window: None,
            severity_table: SeverityTable::default(),
            recency_buckets: RecencyBuckets::default(),
            incident_failure: IncidentFailurePolicy::default(),
            max_snap_distance_meters: None,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !self.proximity_meters.is_finite() || self.proximity_meters <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "proximity_meters must be positive, got {}",
                self.proximity_meters
            )));
        }

        if !self.incident_bbox_pad_deg.is_finite() || self.incident_bbox_pad_deg < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "incident_bbox_pad_deg must be non-negative, got {}",
                self.incident_bbox_pad_deg
            )));
        }

        if let Some(window) = &self.incident_time_window {
            window.validate()?;
        }

        if self.checked_cache_ttl().is_none() {
            return Err(Error::InvalidConfig(format!(
                "cache_ttl_seconds out of range, got {}",
                self.cache_ttl_seconds
            )));
        }

        if let Some(max) = self.max_snap_distance_meters {
            if max.is_nan() || max < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "max_snap_distance_meters must be non-negative, got {max}"
                )));
            }
        }

        self.severity_table.validate()?;
        self.recency_buckets.validate()
    }

    /// Saturates at `TimeDelta::MAX` for values `validate` rejects.
    pub fn cache_ttl(&self) -> TimeDelta {
        self.checked_cache_ttl().unwrap_or(TimeDelta::MAX)
    }

    fn checked_cache_ttl(&self) -> Option<TimeDelta> {
        i64::try_from(self.cache_ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RouterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl(), TimeDelta::minutes(30));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RouterConfig = serde_json::from_str(
            r#"{"proximity_meters": 50, "incident_failure": "fail",
                "incident_time_window": {"before_seconds": 10800, "after_seconds": 10800}}"#,
        )
        .unwrap();
        assert_eq!(config.proximity_meters, 50.0);
        assert_eq!(config.incident_failure, IncidentFailurePolicy::Fail);
        assert_eq!(config.incident_time_window, Some(TimeWindow::hours(3, 3)));
        assert_eq!(config.alpha, 10_000.0);
    }

    #[test]
    fn rejects_ttl_beyond_time_delta_range() {
        let config = RouterConfig {
            cache_ttl_seconds: 10_000_000_000_000_000,
            ..RouterConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert_eq!(config.cache_ttl(), TimeDelta::MAX);
    }

    #[test]
    fn rejects_time_window_beyond_time_delta_range() {
        let config = RouterConfig {
            incident_time_window: Some(TimeWindow {
                before_seconds: i64::MAX,
                after_seconds: 0,
            }),
            ..RouterConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn overflowing_hours_saturate_and_fail_validation() {
        let window = TimeWindow::hours(i64::MAX / 100, 3);
        assert_eq!(window.before_seconds, i64::MAX);
        assert_eq!(window.after_seconds, 10_800);

        let config = RouterConfig {
            incident_time_window: Some(window),
            ..RouterConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn wide_window_clamps_instead_of_overflowing() {
        let now = DateTime::from_timestamp(1_750_000_000, 0).unwrap();
        let window = TimeWindow {
            before_seconds: i64::MAX / 1000,
            after_seconds: i64::MAX / 1000,
        };
        assert!(
            RouterConfig {
                incident_time_window: Some(window),
                ..RouterConfig::default()
            }
            .validate()
            .is_ok()
        );
        assert_eq!(
            window.around(now),
            (DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
        );
    }

    #[test]
    fn rejects_negative_weights() {
        let config = RouterConfig {
            beta: -1.0,
            ..RouterConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
