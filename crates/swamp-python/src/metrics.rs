use pyo3::prelude::*;

use swamp_core::metrics;

define_pair_score! {
    /// Root mean square error.
    rmse => metrics::rmse
}

define_pair_score! {
    /// Mean of simulated - observed.
    mean_bias => metrics::mean_bias
}

define_pair_score! {
    /// Nash-Sutcliffe efficiency.
    nse => metrics::nse
}

define_pair_score! {
    /// Pearson correlation coefficient.
    pearson_r => metrics::pearson_r
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "metrics")?;
    m.add_function(wrap_pyfunction!(rmse, &m)?)?;
    m.add_function(wrap_pyfunction!(mean_bias, &m)?)?;
    m.add_function(wrap_pyfunction!(nse, &m)?)?;
    m.add_function(wrap_pyfunction!(pearson_r, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
