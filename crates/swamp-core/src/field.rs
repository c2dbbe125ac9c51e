/// Soil-moisture cells and fields.
///
/// A cell is undefined for one of two distinct reasons: the land mask excludes
/// it (`Masked`) or no usable data reached it (`Missing`). Neither is encoded
/// as a float NaN inside the core.
use ndarray::{Array2, ArrayView2, Zip};

use crate::coefficients::CoefficientField;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// Excluded by the land mask (non-positive coefficient).
    Masked,
    /// Inside the land mask but without a usable value.
    Missing,
    /// Volumetric water content [m3 m-3].
    Value(f64),
}

impl Cell {
    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        matches!(self, Cell::Value(_))
    }

    /// Wrap a raw float, mapping NaN to `Missing`.
    #[inline]
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            Cell::Missing
        } else {
            Cell::Value(v)
        }
    }

    /// Float view with NaN for both kinds of undefined.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

/// One day of soil moisture over the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilMoistureField {
    cells: Array2<Cell>,
}

impl SoilMoistureField {
    pub fn from_cells(cells: Array2<Cell>) -> Self {
        Self { cells }
    }

    /// Build from raw floats (NaN becomes `Missing`), then apply the land mask.
    pub fn from_raw_masked(raw: ArrayView2<f64>, coefficients: &CoefficientField) -> Self {
        let cells = Zip::from(raw)
            .and(coefficients.weights())
            .map_collect(|&v, c| match c {
                Some(_) => Cell::from_f64(v),
                None => Cell::Masked,
            });
        Self { cells }
    }

    /// Same value at every unmasked cell.
    pub fn filled(coefficients: &CoefficientField, cell: Cell) -> Self {
        let cells = coefficients
            .weights()
            .mapv(|c| if c.is_some() { cell } else { Cell::Masked });
        Self { cells }
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn get(&self, ilat: usize, ilon: usize) -> Option<Cell> {
        self.cells.get((ilat, ilon)).copied()
    }

    /// Float array with NaN wherever the cell is undefined.
    pub fn to_array(&self) -> Array2<f64> {
        self.cells.mapv(Cell::to_f64)
    }

    /// `true` where the land mask excludes the cell.
    pub fn masked(&self) -> Array2<bool> {
        self.cells.mapv(|c| c == Cell::Masked)
    }

    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().filter_map(|c| c.value())
    }

    /// Copy with every value clamped to `[lo, hi]`. Undefined cells are kept.
    pub fn clipped(&self, lo: f64, hi: f64) -> Self {
        let cells = self.cells.mapv(|c| match c {
            Cell::Value(v) => Cell::Value(v.clamp(lo, hi)),
            other => other,
        });
        Self { cells }
    }

    pub fn count_missing(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Missing).count()
    }
}
