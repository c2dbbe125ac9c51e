/// Latitude/longitude lattice shared by every gridded quantity.
///
/// Built once at startup and shared by `Arc`; never mutated afterwards.
use ndarray::Array1;

use crate::constants::{CONUS_LAT_BOUNDS, CONUS_LON_BOUNDS, CONUS_NLAT, CONUS_NLON};
use crate::error::{Result, SwampError};

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lat: Array1<f64>,
    lon: Array1<f64>,
}

impl Grid {
    /// Create a grid, checking both axes are non-empty, finite and strictly ascending.
    pub fn new(lat: Array1<f64>, lon: Array1<f64>) -> Result<Self> {
        check_axis("lat", &lat)?;
        check_axis("lon", &lon)?;
        Ok(Self { lat, lon })
    }

    /// Evenly spaced grid with inclusive endpoints on both axes.
    pub fn regular(lat_bounds: (f64, f64), nlat: usize, lon_bounds: (f64, f64), nlon: usize) -> Result<Self> {
        Self::new(
            linspace(lat_bounds.0, lat_bounds.1, nlat),
            linspace(lon_bounds.0, lon_bounds.1, nlon),
        )
    }

    /// The default continental-US output grid (720 x 1150).
    pub fn conus() -> Self {
        Self {
            lat: linspace(CONUS_LAT_BOUNDS.0, CONUS_LAT_BOUNDS.1, CONUS_NLAT),
            lon: linspace(CONUS_LON_BOUNDS.0, CONUS_LON_BOUNDS.1, CONUS_NLON),
        }
    }

    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    /// (lat_count, lon_count)
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    pub fn n_cells(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    /// Fail with `ShapeMismatch` unless `shape` equals this grid's shape.
    pub fn check_shape(&self, name: &'static str, shape: (usize, usize)) -> Result<()> {
        if shape != self.shape() {
            return Err(SwampError::ShapeMismatch {
                name,
                expected: self.shape(),
                actual: shape,
            });
        }
        Ok(())
    }

    /// Index of the grid cell whose centre is closest to (lat, lon).
    ///
    /// Returns `None` when the point lies more than half a spacing outside the grid.
    pub fn nearest_index(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        Some((nearest_on_axis(&self.lat, lat)?, nearest_on_axis(&self.lon, lon)?))
    }
}

/// `n` evenly spaced values on [start, stop], endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            Array1::from_iter((0..n).map(|i| {
                if i == n - 1 {
                    stop
                } else {
                    start + step * i as f64
                }
            }))
        }
    }
}

fn check_axis(name: &str, axis: &Array1<f64>) -> Result<()> {
    if axis.is_empty() {
        return Err(SwampError::InvalidGrid(format!("{name} axis is empty")));
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(SwampError::InvalidGrid(format!(
            "{name} axis contains non-finite values"
        )));
    }
    if axis.windows(2).into_iter().any(|w| w[1] <= w[0]) {
        return Err(SwampError::InvalidGrid(format!(
            "{name} axis is not strictly ascending"
        )));
    }
    Ok(())
}

fn nearest_on_axis(axis: &Array1<f64>, x: f64) -> Option<usize> {
    if !x.is_finite() {
        return None;
    }
    let n = axis.len();
    let half = if n > 1 {
        0.5 * (axis[n - 1] - axis[0]) / (n - 1) as f64
    } else {
        0.0
    };
    if x < axis[0] - half || x > axis[n - 1] + half {
        return None;
    }
    // First index with axis[i] >= x
    let upper = axis.as_slice().map_or_else(
        || axis.iter().position(|&v| v >= x).unwrap_or(n),
        |s| s.partition_point(|&v| v < x),
    );
    if upper == 0 {
        return Some(0);
    }
    if upper == n {
        return Some(n - 1);
    }
    if (x - axis[upper - 1]) <= (axis[upper] - x) {
        Some(upper - 1)
    } else {
        Some(upper)
    }
}
