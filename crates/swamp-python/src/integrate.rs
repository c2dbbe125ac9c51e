use std::sync::Arc;

use numpy::{PyArray1, PyArray2, PyArray3, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use tracing::debug;

use swamp_core::{
    CoefficientField, ForcingSeries, Grid, IcOptions, IcSelector, InMemoryForcing, IntegrationMode,
    Integrator, InterpMethod,
};

use crate::adapters::{PyInterpolator, PyStationData};
use crate::convert::{axis, checked_field, parse_date, to_py_err};

fn parse_selector(ic: Option<&Bound<'_, PyAny>>, shape: (usize, usize)) -> PyResult<IcSelector> {
    let Some(ic) = ic.filter(|v| !v.is_none()) else {
        return Ok(IcSelector::Zero);
    };
    if let Ok(name) = ic.extract::<String>() {
        return name.parse().map_err(to_py_err);
    }
    match ic.extract::<PyReadonlyArray2<f64>>() {
        Ok(field) => Ok(IcSelector::Field(checked_field(&field, shape, "ic")?)),
        Err(_) => Err(PyValueError::new_err(
            "ic must be None, one of 'zero', 'crn', 'awc', or a 2-D float array",
        )),
    }
}

fn parse_options(options: Option<&Bound<'_, PyDict>>) -> PyResult<IcOptions> {
    let mut out = IcOptions::default();
    let Some(options) = options else {
        return Ok(out);
    };
    for (key, value) in options.iter() {
        let key: String = key.extract()?;
        match key.as_str() {
            "method" => {
                let method: String = value.extract()?;
                out.method = method.parse::<InterpMethod>().map_err(to_py_err)?;
            }
            "hres" => out.hres = value.extract()?,
            "rbf_func" => out.rbf_func = value.extract()?,
            "require_stations" => out.require_stations = value.extract()?,
            other => {
                return Err(PyValueError::new_err(format!("unknown ic_options key {other:?}")));
            }
        }
    }
    out.validate().map_err(to_py_err)?;
    Ok(out)
}

/// Integrate daily P - ET [mm] from `start` for `forcing.shape[0]` days.
///
/// Returns a dict with `sm` (days, lat, lon; NaN where undefined), `masked`,
/// `dates` and one array per daily statistic.
#[pyfunction]
#[pyo3(signature = (
    lat, lon, coefficients, forcing, start,
    ic=None, mode="weighted", depth_mm=250.0,
    station_data=None, interpolate=None, ic_options=None
))]
#[allow(clippy::too_many_arguments)]
pub fn run<'py>(
    py: Python<'py>,
    lat: PyReadonlyArray1<'py, f64>,
    lon: PyReadonlyArray1<'py, f64>,
    coefficients: PyReadonlyArray2<'py, f64>,
    forcing: PyReadonlyArray3<'py, f64>,
    start: &Bound<'py, PyAny>,
    ic: Option<&Bound<'py, PyAny>>,
    mode: &str,
    depth_mm: f64,
    station_data: Option<Py<PyAny>>,
    interpolate: Option<Py<PyAny>>,
    ic_options: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyDict>> {
    let grid = Arc::new(Grid::new(axis(&lat, "lat")?, axis(&lon, "lon")?).map_err(to_py_err)?);
    let shape = grid.shape();
    let coefficients = CoefficientField::new(grid, checked_field(&coefficients, shape, "coefficients")?)
        .map_err(to_py_err)?;
    let masked = coefficients.mask();

    let start = parse_date(start, "start")?;
    let days = forcing.as_array().outer_iter().map(|d| d.to_owned()).collect::<Vec<_>>();
    let n_days = days.len();
    if n_days == 0 {
        return Err(PyValueError::new_err("forcing must hold at least one day"));
    }
    let end = start + chrono::Days::new(n_days as u64 - 1);
    let series = ForcingSeries::new(start, days).map_err(to_py_err)?;

    let selector = parse_selector(ic, shape)?;
    let options = parse_options(ic_options)?;
    let mode: IntegrationMode = mode.parse().map_err(to_py_err)?;

    let mut integrator = Integrator::new(Arc::new(coefficients), Arc::new(InMemoryForcing::new(series)))
        .with_mode(mode)
        .with_depth_mm(depth_mm)
        .map_err(to_py_err)?;
    if let Some(callable) = station_data {
        integrator = integrator.with_stations(Arc::new(PyStationData::new(callable)));
    }
    if let Some(callable) = interpolate {
        integrator = integrator.with_interpolator(Arc::new(PyInterpolator::new(callable)));
    }
    debug!(?shape, n_days, %mode, ic = selector.name(), "python run request");

    let result = py
        .allow_threads(|| integrator.run(start, end, selector, &options))
        .map_err(to_py_err)?;

    let dict = PyDict::new(py);
    dict.set_item("sm", PyArray3::from_owned_array(py, result.to_array()))?;
    dict.set_item("masked", PyArray2::from_owned_array(py, masked))?;
    let dates: Vec<String> = result.dates().map(|d| d.to_string()).collect();
    dict.set_item("dates", PyList::new(py, dates)?)?;
    let stats = result.daily_stats();
    for (name, column) in stats.columns() {
        dict.set_item(name, PyArray1::from_slice(py, column))?;
    }
    Ok(dict)
}

/// Latitude and longitude axes of the default CONUS grid.
#[pyfunction]
pub fn conus_grid(py: Python<'_>) -> (Bound<'_, PyArray1<f64>>, Bound<'_, PyArray1<f64>>) {
    let grid = Grid::conus();
    (
        PyArray1::from_owned_array(py, grid.lat().clone()),
        PyArray1::from_owned_array(py, grid.lon().clone()),
    )
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(run, m)?)?;
    m.add_function(wrap_pyfunction!(conus_grid, m)?)?;
    Ok(())
}
