/// Python callables wrapped as core collaborators.
///
/// The core calls these from inside `allow_threads`, so each call takes the
/// GIL for its own duration. Python exceptions are reported as data errors.
use chrono::NaiveDate;
use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use swamp_core::regrid::GriddedField;
use swamp_core::station::{ScatteredPoints, StationObservation};
use swamp_core::{IcOptions, Result, SpatialInterpolator, StationDataProvider, SwampError};

use crate::convert::parse_date;

fn optional_f64(row: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<f64>> {
    match row.get_item(key)? {
        Some(v) if !v.is_none() => Ok(Some(v.extract()?)),
        _ => Ok(None),
    }
}

fn observation(row: &Bound<'_, PyAny>) -> PyResult<StationObservation> {
    let row = row.downcast::<PyDict>()?;
    let station_id = match row.get_item("station_id")? {
        Some(v) => v.extract()?,
        None => 0,
    };
    let date = match row.get_item("date")? {
        Some(v) => parse_date(&v, "station date")?,
        None => {
            return Err(pyo3::exceptions::PyKeyError::new_err("station row has no 'date'"));
        }
    };
    Ok(StationObservation {
        station_id,
        date,
        latitude: optional_f64(row, "latitude")?,
        longitude: optional_f64(row, "longitude")?,
        soil_moisture_5cm: optional_f64(row, "soil_moisture_5cm")?,
        soil_moisture_10cm: optional_f64(row, "soil_moisture_10cm")?,
        soil_moisture_20cm: optional_f64(row, "soil_moisture_20cm")?,
    })
}

/// `station_data(dates: list[str]) -> list[dict]`.
pub struct PyStationData {
    callable: Py<PyAny>,
}

impl PyStationData {
    pub fn new(callable: Py<PyAny>) -> Self {
        Self { callable }
    }

    fn fetch(&self, py: Python<'_>, dates: &[NaiveDate]) -> PyResult<Vec<StationObservation>> {
        let iso: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
        let rows = self.callable.bind(py).call1((PyList::new(py, iso)?,))?;
        rows.try_iter()?.map(|row| observation(&row?)).collect()
    }
}

impl StationDataProvider for PyStationData {
    fn get_station_data(&self, dates: &[NaiveDate]) -> Result<Vec<StationObservation>> {
        Python::with_gil(|py| self.fetch(py, dates))
            .map_err(|e| SwampError::StationDataUnavailable(e.to_string()))
    }
}

/// `interpolate(x, y, v, method, hres, rbf_func) -> (lat, lon, values)`.
pub struct PyInterpolator {
    callable: Py<PyAny>,
}

impl PyInterpolator {
    pub fn new(callable: Py<PyAny>) -> Self {
        Self { callable }
    }

    fn call(&self, py: Python<'_>, points: &ScatteredPoints, options: &IcOptions) -> PyResult<GriddedField> {
        let args = (
            PyArray1::from_slice(py, &points.x),
            PyArray1::from_slice(py, &points.y),
            PyArray1::from_slice(py, &points.v),
            options.method.as_str(),
            options.hres,
            options.rbf_func.as_deref(),
        );
        let out = self.callable.bind(py).call1(args)?;
        let (lat, lon, values): (PyReadonlyArray1<f64>, PyReadonlyArray1<f64>, PyReadonlyArray2<f64>) =
            out.extract()?;
        GriddedField::new(
            lat.as_array().to_owned(),
            lon.as_array().to_owned(),
            values.as_array().to_owned(),
        )
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }
}

impl SpatialInterpolator for PyInterpolator {
    fn interpolate(&self, points: &ScatteredPoints, options: &IcOptions) -> Result<GriddedField> {
        Python::with_gil(|py| self.call(py, points, options))
            .map_err(|e| SwampError::Interpolation(e.to_string()))
    }
}
