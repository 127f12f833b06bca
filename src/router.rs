use std::sync::Arc;

use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

use crate::routing::{inspection_to_py, parse_request, route_to_py, to_py_err};
use saferoute_core::model::incident::parse_timestamp;
use saferoute_core::prelude::*;

/// SafeRouter
///
/// Plans walking, cycling and driving routes that avoid recent, severe crime
/// incidents while keeping distance reasonable.
///
/// Road graphs are read from ``<graph_dir>/<region>_<network>.json`` on first
/// use and kept for the lifetime of the router. Edge risks are cached for
/// ``cache_ttl_seconds``, so incidents added later only take effect once the
/// cached weights expire.
///
/// Incidents come either from ``incidents_path`` (a JSON or CSV file re-read
/// on every request) or, when no path is given, from an in-memory store fed
/// with ``add_incident``.
///
/// Example:
///
/// .. code-block:: python
///
///     router = SafeRouter("graphs/")
///     router.add_incident(23.7805, 90.4155, "robbery")
///     result = router.find_safest_route(23.7800, 90.4100, 23.7900, 90.4200, "walk")
#[gen_stub_pyclass]
#[pyclass(name = "SafeRouter")]
pub struct PySafeRouter {
    pub(crate) inner: SafeRouter,
    store: Option<Arc<MemoryIncidentStore>>,
}

impl PySafeRouter {
    pub(crate) fn build(
        graph_dir: &str,
        incidents_path: Option<&str>,
        config: RouterConfig,
    ) -> PyResult<Self> {
        let graphs = FileGraphSource::new(graph_dir);
        let (inner, store) = match incidents_path {
            Some(path) => (
                SafeRouter::new(config, graphs, FileIncidentSource::new(path)),
                None,
            ),
            None => {
                let store = Arc::new(MemoryIncidentStore::new());
                (
                    SafeRouter::new(config, graphs, Arc::clone(&store)),
                    Some(store),
                )
            }
        };

        Ok(Self {
            inner: inner.map_err(to_py_err)?,
            store,
        })
    }
}

#[gen_stub_pymethods]
#[pymethods]
impl PySafeRouter {
    #[new]
    #[pyo3(signature = (
        graph_dir,
        incidents_path=None,
        alpha=10_000.0,
        beta=1e-5,
        proximity_meters=30.0,
        cache_ttl_seconds=1800,
        incident_bbox_pad_deg=0.1,
        incident_window_hours=None,
        fail_on_incident_error=false,
        max_snap_distance_meters=None,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph_dir: &str,
        incidents_path: Option<&str>,
        alpha: f64,
        beta: f64,
        proximity_meters: f64,
        cache_ttl_seconds: u64,
        incident_bbox_pad_deg: f64,
        incident_window_hours: Option<i64>,
        fail_on_incident_error: bool,
        max_snap_distance_meters: Option<f64>,
    ) -> PyResult<Self> {
        let config = RouterConfig {
            alpha,
            beta,
            proximity_meters,
            cache_ttl_seconds,
            incident_bbox_pad_deg,
            incident_time_window: incident_window_hours.map(|hours| TimeWindow::hours(hours, hours)),
            incident_failure: if fail_on_incident_error {
                IncidentFailurePolicy::Fail
            } else {
                IncidentFailurePolicy::Degrade
            },
            max_snap_distance_meters,
            ..RouterConfig::default()
        };
        Self::build(graph_dir, incidents_path, config)
    }

    /// Record an incident in the in-memory store.
    ///
    /// ``timestamp`` is an ISO 8601 string; naive values are read as UTC.
    /// Defaults to the current time.
    #[pyo3(signature = (lat, lng, kind, timestamp=None))]
    pub fn add_incident(
        &self,
        lat: f64,
        lng: f64,
        kind: &str,
        timestamp: Option<&str>,
    ) -> PyResult<()> {
        let store = self.store.as_ref().ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
                "This router reads incidents from a file",
            )
        })?;
        let timestamp = match timestamp {
            Some(value) => parse_timestamp(value).map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "Invalid timestamp '{value}': {e}"
                ))
            })?,
            None => self.inner.now(),
        };

        store.insert(Incident::new(lat, lng, kind, timestamp));
        Ok(())
    }

    /// Number of incidents in the in-memory store, or None for file-backed routers.
    pub fn incident_count(&self) -> Option<usize> {
        self.store.as_ref().map(|store| store.len())
    }

    /// Find the safest route between two points
    ///
    /// Returns
    /// -------
    /// dict
    ///     ``route`` (list of ``{"lat", "lng"}``), ``nodes``, ``risk``,
    ///     ``length_meters`` and ``cost``
    #[pyo3(signature = (start_lat, start_lng, end_lat, end_lng, network_type="walk"))]
    pub fn find_safest_route<'py>(
        &self,
        py: Python<'py>,
        start_lat: f64,
        start_lng: f64,
        end_lat: f64,
        end_lng: f64,
        network_type: &str,
    ) -> PyResult<Bound<'py, PyDict>> {
        let request = parse_request(start_lat, start_lng, end_lat, end_lng, network_type)?;
        let route = py
            .detach(|| self.inner.find_safest_route(&request))
            .map_err(to_py_err)?;
        route_to_py(py, &route)
    }

    /// Safest route as a GeoJSON Feature string
    #[pyo3(signature = (start_lat, start_lng, end_lat, end_lng, network_type="walk"))]
    pub fn route_geojson(
        &self,
        py: Python<'_>,
        start_lat: f64,
        start_lng: f64,
        end_lat: f64,
        end_lng: f64,
        network_type: &str,
    ) -> PyResult<String> {
        let request = parse_request(start_lat, start_lng, end_lat, end_lng, network_type)?;
        py.detach(|| {
            self.inner
                .find_safest_route(&request)
                .and_then(|route| route.to_geojson_string())
        })
        .map_err(to_py_err)
    }

    /// Plan a route and report whether a point lies on it
    ///
    /// Returns
    /// -------
    /// dict
    ///     ``on_route``, ``nearest_edge_meters``, ``route`` and per-edge
    ///     ``edge_risks``
    #[pyo3(signature = (incident_lat, incident_lng, start_lat, start_lng, end_lat, end_lng, network_type="walk"))]
    #[allow(clippy::too_many_arguments)]
    pub fn inspect_incident<'py>(
        &self,
        py: Python<'py>,
        incident_lat: f64,
        incident_lng: f64,
        start_lat: f64,
        start_lng: f64,
        end_lat: f64,
        end_lng: f64,
        network_type: &str,
    ) -> PyResult<Bound<'py, PyDict>> {
        let request = parse_request(start_lat, start_lng, end_lat, end_lng, network_type)?;
        let point = Coordinate::new(incident_lat, incident_lng);
        let inspection = py
            .detach(|| self.inner.inspect_incident(&request, point))
            .map_err(to_py_err)?;
        inspection_to_py(py, &inspection)
    }

    /// Number of cached edge weights, fresh or expired
    pub fn cached_weights(&self) -> usize {
        self.inner.cache().len()
    }

    /// Drop expired edge weights and return how many were removed
    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired_weights()
    }

    pub fn clear_cache(&self) {
        self.inner.cache().clear();
    }

    /// File stems of the graphs loaded so far
    pub fn loaded_graphs(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .inner
            .catalog()
            .keys()
            .iter()
            .map(ToString::to_string)
            .collect();
        keys.sort();
        keys
    }

    fn __repr__(&self) -> String {
        format!(
            "SafeRouter with {} loaded graphs and {} cached edge weights",
            self.inner.catalog().len(),
            self.inner.cache().len()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
