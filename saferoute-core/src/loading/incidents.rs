//! Incident stores queried once per request

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use geo::Rect;
use log::warn;

use crate::geodesy::bbox_contains;
use crate::interrupt::Interrupt;
use crate::model::Incident;
use crate::model::incident::IncidentRow;
use crate::Error;

/// Bounding box, and optionally an inclusive absolute time range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentQuery {
    pub bounds: Rect<f64>,
    pub window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl IncidentQuery {
    pub fn within(bounds: Rect<f64>) -> Self {
        Self {
            bounds,
            window: None,
        }
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.window = Some((from, to));
        self
    }

    pub fn matches(&self, incident: &Incident) -> bool {
        bbox_contains(&self.bounds, incident.location)
            && self
                .window
                .is_none_or(|(from, to)| incident.timestamp >= from && incident.timestamp <= to)
    }
}

/// External crime store. Results are treated as an immutable snapshot;
/// no ordering or deduplication is assumed.
pub trait IncidentSource: Send + Sync {
    /// # Errors
    ///
    /// `IncidentSourceUnavailable` on upstream failure, `Cancelled` when
    /// `interrupt` fires.
    fn incidents(
        &self,
        query: &IncidentQuery,
        interrupt: &dyn Interrupt,
    ) -> Result<Vec<Incident>, Error>;
}

impl<S: IncidentSource + ?Sized> IncidentSource for Arc<S> {
    fn incidents(
        &self,
        query: &IncidentQuery,
        interrupt: &dyn Interrupt,
    ) -> Result<Vec<Incident>, Error> {
        (**self).incidents(query, interrupt)
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryIncidentStore {
    incidents: RwLock<Vec<Incident>>,
}

impl MemoryIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_incidents(incidents: Vec<Incident>) -> Self {
        Self {
            incidents: RwLock::new(incidents),
        }
    }

    pub fn insert(&self, incident: Incident) {
        self.write().push(incident);
    }

    pub fn extend(&self, incidents: impl IntoIterator<Item = Incident>) {
        self.write().extend(incidents);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Incident>> {
        self.incidents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Incident>> {
        self.incidents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl IncidentSource for MemoryIncidentStore {
    fn incidents(
        &self,
        query: &IncidentQuery,
        interrupt: &dyn Interrupt,
    ) -> Result<Vec<Incident>, Error> {
        interrupt.check()?;
        Ok(self
            .read()
            .iter()
            .filter(|incident| query.matches(incident))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncidentFileFormat {
    Json,
    Csv,
}

/// Incident file re-read on every query, so an external writer can update it.
///
/// `.csv` files carry `lat,lng,type,timestamp` columns; anything else is read
/// as a JSON array of `{location: {lat, lng}, type, timestamp}` records.
#[derive(Debug, Clone)]
pub struct FileIncidentSource {
    path: PathBuf,
    format: IncidentFileFormat,
}

impl FileIncidentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => IncidentFileFormat::Csv,
            _ => IncidentFileFormat::Json,
        };
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Incident>, Error> {
        let unavailable = |e: &dyn std::fmt::Display| {
            Error::IncidentSourceUnavailable(format!("{}: {e}", self.path.display()))
        };

        match self.format {
            IncidentFileFormat::Json => {
                let file = File::open(&self.path).map_err(|e| unavailable(&e))?;
                serde_json::from_reader(BufReader::new(file)).map_err(|e| unavailable(&e))
            }
            IncidentFileFormat::Csv => {
                let mut reader = csv::Reader::from_path(&self.path).map_err(|e| unavailable(&e))?;
                let mut incidents = Vec::new();
                let mut rejected = 0usize;
                for row in reader.deserialize::<IncidentRow>() {
                    match row {
                        Ok(row) => incidents.push(row.into()),
                        Err(_) => rejected += 1,
                    }
                }
                if rejected > 0 {
                    warn!(
                        "Ignored {rejected} unreadable rows in {}",
                        self.path.display()
                    );
                }
                Ok(incidents)
            }
        }
    }
}

impl IncidentSource for FileIncidentSource {
    fn incidents(
        &self,
        query: &IncidentQuery,
        interrupt: &dyn Interrupt,
    ) -> Result<Vec<Incident>, Error> {
        interrupt.check()?;
        let mut incidents = self.read_all()?;
        interrupt.check()?;
        incidents.retain(|incident| query.matches(incident));
        Ok(incidents)
    }
}
