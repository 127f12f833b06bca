use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3_stub_gen::derive::gen_stub_pyfunction;

use crate::router::PySafeRouter;
use saferoute_core::prelude::*;

/// Bad input becomes `ValueError`, everything else `RuntimeError`.
pub(crate) fn to_py_err(error: Error) -> PyErr {
    match error {
        Error::NoRegion { .. }
        | Error::NoRoadNearby { .. }
        | Error::InvalidConfig(_)
        | Error::InvalidData(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(error.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
            "Route calculation failed: {error}"
        )),
    }
}

pub(crate) fn parse_request(
    start_lat: f64,
    start_lng: f64,
    end_lat: f64,
    end_lng: f64,
    network_type: &str,
) -> PyResult<RouteRequest> {
    let network_type = network_type.parse::<NetworkType>().map_err(to_py_err)?;
    Ok(RouteRequest::new(
        Coordinate::new(start_lat, start_lng),
        Coordinate::new(end_lat, end_lng),
        network_type,
    ))
}

fn coordinates_to_py<'py>(
    py: Python<'py>,
    coordinates: &[Coordinate],
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    coordinates
        .iter()
        .map(|coordinate| {
            let point = PyDict::new(py);
            point.set_item("lat", coordinate.lat)?;
            point.set_item("lng", coordinate.lng)?;
            Ok(point)
        })
        .collect()
}

/// Convert a SafeRoute to a Python dictionary
pub(crate) fn route_to_py<'py>(py: Python<'py>, route: &SafeRoute) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("route", coordinates_to_py(py, &route.route)?)?;
    dict.set_item("nodes", route.nodes.clone())?;
    dict.set_item("risk", route.risk)?;
    dict.set_item("length_meters", route.length_meters)?;
    dict.set_item("cost", route.cost)?;
    Ok(dict)
}

pub(crate) fn inspection_to_py<'py>(
    py: Python<'py>,
    inspection: &RouteInspection,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("on_route", inspection.on_route)?;
    dict.set_item("nearest_edge_meters", inspection.nearest_edge_meters)?;
    dict.set_item("route", route_to_py(py, &inspection.route)?)?;

    let edges = inspection
        .edge_risks
        .iter()
        .map(|edge| {
            let item = PyDict::new(py);
            item.set_item("from", edge.from)?;
            item.set_item("to", edge.to)?;
            item.set_item("risk", edge.risk)?;
            item.set_item("length_meters", edge.length_meters)?;
            Ok(item)
        })
        .collect::<PyResult<Vec<_>>>()?;
    dict.set_item("edge_risks", edges)?;
    Ok(dict)
}

/// Find the safest route with a throwaway router
///
/// Convenience for one-off queries. Graphs are loaded from `graph_dir` on
/// every call and no edge weights are kept; build a ``SafeRouter`` to reuse
/// them across calls.
///
/// Parameters
/// ----------
/// graph_dir : str
///     Directory holding ``<region>_<network>.json`` graph files
/// start_lat, start_lng, end_lat, end_lng : float
///     Endpoints in WGS84 decimal degrees
/// network_type : str, default="walk"
///     One of ``walk``, ``bike`` or ``drive``
/// incidents_path : str, optional
///     JSON or CSV incident file. Without it the route is the shortest one.
///
/// Returns
/// -------
/// dict
///     ``route`` (list of ``{"lat", "lng"}``), ``nodes``, ``risk``,
///     ``length_meters`` and ``cost``
///
/// Raises
/// ------
/// ValueError
///     If an endpoint lies outside every region or far from any road
/// RuntimeError
///     If the graph cannot be loaded or no path exists
#[pyfunction]
#[gen_stub_pyfunction]
#[pyo3(signature = (graph_dir, start_lat, start_lng, end_lat, end_lng, network_type="walk", incidents_path=None))]
#[allow(clippy::too_many_arguments)]
pub fn find_safest_route<'py>(
    py: Python<'py>,
    graph_dir: &str,
    start_lat: f64,
    start_lng: f64,
    end_lat: f64,
    end_lng: f64,
    network_type: &str,
    incidents_path: Option<&str>,
) -> PyResult<Bound<'py, PyDict>> {
    let router = PySafeRouter::build(graph_dir, incidents_path, RouterConfig::default())?;
    let request = parse_request(start_lat, start_lng, end_lat, end_lng, network_type)?;

    let route = py
        .detach(|| router.inner.find_safest_route(&request))
        .map_err(to_py_err)?;
    route_to_py(py, &route)
}
