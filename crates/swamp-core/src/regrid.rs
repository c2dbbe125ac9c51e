/// Resampling of rectilinear lattices onto the output grid.
///
/// Used for station-interpolated initial conditions and for bringing
/// precipitation and ET fields onto a common lattice.
use ndarray::{Array1, Array2};

use crate::error::{Result, SwampError};
use crate::grid::Grid;

/// A field on an arbitrary rectilinear lattice.
///
/// Axes may be ascending or descending (raster products usually store
/// latitude north-to-south) but must be strictly monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedField {
    pub lat: Array1<f64>,
    pub lon: Array1<f64>,
    pub values: Array2<f64>,
}

impl GriddedField {
    pub fn new(lat: Array1<f64>, lon: Array1<f64>, values: Array2<f64>) -> Result<Self> {
        if values.dim() != (lat.len(), lon.len()) {
            return Err(SwampError::InvalidGrid(format!(
                "values have shape {:?} but axes are ({}, {})",
                values.dim(),
                lat.len(),
                lon.len()
            )));
        }
        check_monotonic("lat", &lat)?;
        check_monotonic("lon", &lon)?;
        Ok(Self { lat, lon, values })
    }

    /// `true` when both axes match `other` exactly.
    pub fn same_lattice(&self, other: &GriddedField) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

/// Bracketing source indices and the weight of the second one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    i0: usize,
    i1: usize,
    w1: f64,
}

/// Bilinearly interpolate `source` at every cell of `grid`.
///
/// Cells outside the source extent are NaN. A NaN corner poisons the result
/// only when its weight is non-zero.
pub fn bilinear(source: &GriddedField, grid: &Grid) -> Array2<f64> {
    let lat_brackets: Vec<Option<Bracket>> =
        grid.lat().iter().map(|&y| bracket(&source.lat, y)).collect();
    let lon_brackets: Vec<Option<Bracket>> =
        grid.lon().iter().map(|&x| bracket(&source.lon, x)).collect();

    Array2::from_shape_fn(grid.shape(), |(i, j)| {
        match (lat_brackets[i], lon_brackets[j]) {
            (Some(by), Some(bx)) => blend(&source.values, by, bx),
            _ => f64::NAN,
        }
    })
}

fn blend(values: &Array2<f64>, by: Bracket, bx: Bracket) -> f64 {
    let corners = [
        (by.i0, bx.i0, (1.0 - by.w1) * (1.0 - bx.w1)),
        (by.i0, bx.i1, (1.0 - by.w1) * bx.w1),
        (by.i1, bx.i0, by.w1 * (1.0 - bx.w1)),
        (by.i1, bx.i1, by.w1 * bx.w1),
    ];
    let mut acc = 0.0;
    for (iy, ix, w) in corners {
        if w == 0.0 {
            continue;
        }
        acc += w * values[[iy, ix]];
    }
    acc
}

fn bracket(axis: &Array1<f64>, x: f64) -> Option<Bracket> {
    let n = axis.len();
    if n == 0 || !x.is_finite() {
        return None;
    }
    if n == 1 {
        return (x == axis[0]).then_some(Bracket { i0: 0, i1: 0, w1: 0.0 });
    }

    let descending = axis[n - 1] < axis[0];
    // Position in ascending order -> original index
    let at = |k: usize| if descending { n - 1 - k } else { k };
    let coord = |k: usize| axis[at(k)];

    if x < coord(0) || x > coord(n - 1) {
        return None;
    }

    // First ascending position with coord >= x, clamped so k0 = k1 - 1 is valid
    let mut lo = 0;
    let mut hi = n;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if coord(mid) < x {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    let k1 = lo.clamp(1, n - 1);
    let k0 = k1 - 1;
    let w1 = (x - coord(k0)) / (coord(k1) - coord(k0));

    Some(Bracket {
        i0: at(k0),
        i1: at(k1),
        w1,
    })
}

fn check_monotonic(name: &str, axis: &Array1<f64>) -> Result<()> {
    if axis.is_empty() {
        return Err(SwampError::InvalidGrid(format!("{name} axis is empty")));
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(SwampError::InvalidGrid(format!(
            "{name} axis contains non-finite values"
        )));
    }
    let ascending = axis.windows(2).into_iter().all(|w| w[1] > w[0]);
    let descending = axis.windows(2).into_iter().all(|w| w[1] < w[0]);
    if !(ascending || descending) {
        return Err(SwampError::InvalidGrid(format!(
            "{name} axis is not strictly monotonic"
        )));
    }
    Ok(())
}
