use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use router::PySafeRouter;
use routing::find_safest_route;

pub mod router;
pub mod routing;

/// Safest-route planning over regional road networks.
#[pymodule]
fn saferoute(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PySafeRouter>()?;
    m.add_function(wrap_pyfunction!(find_safest_route, m)?)?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
