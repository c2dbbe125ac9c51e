/// Static per-cell weighting coefficients.
///
/// Strictly positive raw values are valid land coefficients; anything else
/// (zero, negative fill values such as -21.52, NaN) is masked.
use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, SwampError};
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientField {
    grid: Arc<Grid>,
    weights: Array2<Option<f64>>,
}

impl CoefficientField {
    /// Mask non-positive entries of `raw`. The shape must match `grid` exactly.
    pub fn new(grid: Arc<Grid>, raw: Array2<f64>) -> Result<Self> {
        grid.check_shape("coefficient field", raw.dim())?;
        let weights = raw.mapv(|c| if c > 0.0 { Some(c) } else { None });
        let field = Self { grid, weights };
        debug!(
            valid = field.valid_count(),
            total = field.grid.n_cells(),
            "coefficient field built"
        );
        Ok(field)
    }

    /// Parse a whitespace-delimited matrix, one grid row (latitude) per line.
    pub fn from_text(grid: Arc<Grid>, text: &str) -> Result<Self> {
        let raw = parse_matrix(text)?;
        Self::new(grid, raw)
    }

    /// Load the coefficient source file. Read once at startup.
    pub fn from_path(grid: Arc<Grid>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SwampError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(grid, &text)
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn weights(&self) -> &Array2<Option<f64>> {
        &self.weights
    }

    pub fn get(&self, ilat: usize, ilon: usize) -> Option<f64> {
        self.weights.get((ilat, ilon)).copied().flatten()
    }

    pub fn is_valid(&self, ilat: usize, ilon: usize) -> bool {
        self.get(ilat, ilon).is_some()
    }

    pub fn valid_count(&self) -> usize {
        self.weights.iter().filter(|c| c.is_some()).count()
    }

    /// `true` where the cell is excluded from the water balance.
    pub fn mask(&self) -> Array2<bool> {
        self.weights.mapv(|c| c.is_none())
    }
}

fn parse_matrix(text: &str) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let start = values.len();
        for token in line.split_whitespace() {
            let v: f64 = token.parse().map_err(|_| {
                SwampError::InvalidConfig(format!(
                    "coefficient line {}: cannot parse {token:?} as a number",
                    lineno + 1
                ))
            })?;
            values.push(v);
        }
        let row_len = values.len() - start;
        match ncols {
            None => ncols = Some(row_len),
            Some(n) if n != row_len => {
                return Err(SwampError::InvalidConfig(format!(
                    "coefficient line {} has {row_len} values, expected {n}",
                    lineno + 1
                )));
            }
            Some(_) => {}
        }
        nrows += 1;
    }

    let ncols = ncols.unwrap_or(0);
    Array2::from_shape_vec((nrows, ncols), values)
        .map_err(|e| SwampError::InvalidConfig(format!("coefficient matrix: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid_2x2() -> Arc<Grid> {
        Arc::new(Grid::new(array![0.0, 1.0], array![0.0, 1.0]).unwrap())
    }

    #[test]
    fn masks_non_positive() {
        let c = CoefficientField::new(grid_2x2(), array![[0.5, 0.0], [-21.52, f64::NAN]]).unwrap();
        assert_eq!(c.get(0, 0), Some(0.5));
        assert!(!c.is_valid(0, 1));
        assert!(!c.is_valid(1, 0));
        assert!(!c.is_valid(1, 1));
        assert_eq!(c.valid_count(), 1);
        assert_eq!(c.mask(), array![[false, true], [true, true]]);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let err = CoefficientField::new(grid_2x2(), Array2::ones((2, 3))).unwrap_err();
        assert!(matches!(
            err,
            SwampError::ShapeMismatch {
                expected: (2, 2),
                actual: (2, 3),
                ..
            }
        ));
    }

    #[test]
    fn parses_text_matrix() {
        let text = "0.1 0.2\n\n-21.52   0.0\n";
        let c = CoefficientField::from_text(grid_2x2(), text).unwrap();
        assert_eq!(c.get(0, 1), Some(0.2));
        assert_eq!(c.valid_count(), 2);
    }

    #[test]
    fn rejects_ragged_text() {
        let err = CoefficientField::from_text(grid_2x2(), "1 2\n3\n").unwrap_err();
        assert!(matches!(err, SwampError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(CoefficientField::from_text(grid_2x2(), "1 x\n3 4\n").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CoefficientField::from_path(grid_2x2(), "/nonexistent/slp_weights.txt").unwrap_err();
        assert!(matches!(err, SwampError::Io { .. }));
    }
}
