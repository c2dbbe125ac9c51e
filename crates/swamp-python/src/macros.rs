/// Generate a `#[pyfunction]` that scores observed against simulated arrays
/// with the named `swamp_core::metrics` function.
///
/// Both arrays must be C-contiguous and of equal length.
macro_rules! define_pair_score {
    ($(#[$meta:meta])* $name:ident => $core_fn:path) => {
        $(#[$meta])*
        #[pyo3::pyfunction]
        fn $name(
            observed: numpy::PyReadonlyArray1<'_, f64>,
            simulated: numpy::PyReadonlyArray1<'_, f64>,
        ) -> pyo3::PyResult<f64> {
            let o = crate::convert::contiguous_slice(&observed)?;
            let s = crate::convert::contiguous_slice(&simulated)?;
            if o.len() != s.len() {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "observed has {} elements but simulated has {}",
                    o.len(),
                    s.len()
                )));
            }
            Ok($core_fn(o, s))
        }
    };
}
