//! Validation of gridded soil moisture against station observations.
//!
//! Pair scores take observed and simulated slices of equal length and return
//! a scalar. Empty input gives NaN.

use chrono::NaiveDate;

use crate::field::SoilMoistureField;
use crate::grid::Grid;
use crate::station::{SoilDepth, StationObservation};

/// Value of the grid cell nearest to (lat, lon), if that cell is defined.
pub fn sample_nearest(field: &SoilMoistureField, grid: &Grid, lat: f64, lon: f64) -> Option<f64> {
    let (i, j) = grid.nearest_index(lat, lon)?;
    field.get(i, j)?.value()
}

/// One station reading next to the model value at its cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationPair {
    pub station_id: u32,
    pub observed: f64,
    pub simulated: f64,
}

/// Pair every usable reading at `depth` on `date` with the field.
///
/// Sentinel readings, stations without coordinates and undefined cells are skipped.
pub fn station_pairs(
    field: &SoilMoistureField,
    grid: &Grid,
    observations: &[StationObservation],
    date: NaiveDate,
    depth: SoilDepth,
) -> Vec<StationPair> {
    observations
        .iter()
        .filter(|o| o.date == date)
        .filter_map(|o| {
            let observed = o.soil_moisture(depth)?;
            let simulated = sample_nearest(field, grid, o.latitude?, o.longitude?)?;
            Some(StationPair {
                station_id: o.station_id,
                observed,
                simulated,
            })
        })
        .collect()
}

/// Split pairs into (observed, simulated) vectors for the scores below.
pub fn unzip_pairs(pairs: &[StationPair]) -> (Vec<f64>, Vec<f64>) {
    pairs.iter().map(|p| (p.observed, p.simulated)).unzip()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mse: f64 = observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum::<f64>()
        / n;
    mse.sqrt()
}

/// Mean of simulated - observed. Positive = model too wet.
pub fn mean_bias(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len() as f64;
    simulated.iter().zip(observed).map(|(s, o)| s - o).sum::<f64>() / n
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    let mean_obs = mean(observed);
    let numerator: f64 = observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum();
    let denominator: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if denominator == 0.0 {
        return f64::NEG_INFINITY;
    }
    1.0 - numerator / denominator
}

/// Pearson correlation. NaN when either side has zero variance.
pub fn pearson_r(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    let mean_o = mean(observed);
    let mean_s = mean(simulated);
    let (mut cov, mut var_o, mut var_s) = (0.0, 0.0, 0.0);
    for (o, s) in observed.iter().zip(simulated) {
        cov += (o - mean_o) * (s - mean_s);
        var_o += (o - mean_o).powi(2);
        var_s += (s - mean_s).powi(2);
    }
    if var_o == 0.0 || var_s == 0.0 {
        return f64::NAN;
    }
    cov / (var_o * var_s).sqrt()
}
