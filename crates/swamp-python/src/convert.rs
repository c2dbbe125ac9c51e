use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use numpy::{PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use swamp_core::{ErrorKind, SwampError};

/// Configuration errors become `ValueError`, data errors `RuntimeError`.
pub fn to_py_err(err: SwampError) -> PyErr {
    match err.kind() {
        ErrorKind::Configuration => PyValueError::new_err(err.to_string()),
        ErrorKind::DataUnavailable => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Validate that a numpy array is C-contiguous and return its slice.
pub fn contiguous_slice<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<&'py [f64]> {
    arr.as_slice()
        .map_err(|_| PyValueError::new_err("array must be C-contiguous"))
}

/// Copy a 1-D coordinate axis out of numpy.
pub fn axis(arr: &PyReadonlyArray1<'_, f64>, name: &str) -> PyResult<Array1<f64>> {
    let view = arr.as_array();
    if view.is_empty() {
        return Err(PyValueError::new_err(format!("{name} must not be empty")));
    }
    Ok(view.to_owned())
}

/// Copy a 2-D field out of numpy, checking its shape.
pub fn checked_field(
    arr: &PyReadonlyArray2<'_, f64>,
    expected: (usize, usize),
    name: &str,
) -> PyResult<Array2<f64>> {
    let view = arr.as_array();
    if view.dim() != expected {
        return Err(PyValueError::new_err(format!(
            "{} must have shape {:?}, got {:?}",
            name,
            expected,
            view.dim()
        )));
    }
    Ok(view.to_owned())
}

/// Accept `"YYYY-MM-DD"` or anything with an ISO `isoformat()` (datetime.date).
pub fn parse_date(obj: &Bound<'_, PyAny>, name: &str) -> PyResult<NaiveDate> {
    let text: String = match obj.extract::<String>() {
        Ok(s) => s,
        Err(_) => obj.call_method0("isoformat")?.extract()?,
    };
    let date_part = text.get(..10).unwrap_or(&text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| PyValueError::new_err(format!("{name}: cannot parse {text:?} as a date ({e})")))
}
