/// Daily forcing data: precipitation minus evapotranspiration [mm].
///
/// The integrator only accepts a dense daily series on its grid. Gap filling
/// and regridding belong to the forcing provider; the helpers at the bottom of
/// this module are the building blocks providers use for that.
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView2};
use tracing::{debug, warn};

use crate::error::{Result, SwampError};
use crate::grid::Grid;
use crate::regrid::{bilinear, GriddedField};
use crate::traits::ForcingProvider;

// -- Date range --

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Fails with `InvalidDateRange` when `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(SwampError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, both ends included.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Always `false`: a valid range holds at least one day.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len())
    }
}

// -- Forcing series --

/// Dense daily sequence of forcing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcingSeries {
    start: NaiveDate,
    fields: Vec<Array2<f64>>,
}

impl ForcingSeries {
    /// Create a series starting at `start`, one field per consecutive day.
    ///
    /// Validates:
    /// - at least one field
    /// - all fields share the first field's shape
    pub fn new(start: NaiveDate, fields: Vec<Array2<f64>>) -> Result<Self> {
        let Some(first) = fields.first() else {
            return Err(SwampError::ForcingUnavailable(
                "forcing series is empty".to_string(),
            ));
        };
        let shape = first.dim();
        for (date, field) in start.iter_days().zip(&fields) {
            if field.dim() != shape {
                return Err(SwampError::ForcingShape {
                    date,
                    expected: shape,
                    actual: field.dim(),
                });
            }
        }
        Ok(Self { start, fields })
    }

    /// Build from explicitly dated fields, which must be consecutive days.
    pub fn from_dated(dated: Vec<(NaiveDate, Array2<f64>)>) -> Result<Self> {
        let Some(&(start, _)) = dated.first() else {
            return Err(SwampError::ForcingUnavailable(
                "forcing series is empty".to_string(),
            ));
        };
        let mut fields = Vec::with_capacity(dated.len());
        for (expected, (found, field)) in start.iter_days().zip(dated) {
            if found != expected {
                return Err(SwampError::ForcingGap { expected, found });
            }
            fields.push(field);
        }
        Self::new(start, fields)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start
            .iter_days()
            .nth(self.fields.len() - 1)
            .unwrap_or(self.start)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.fields.len())
    }

    pub fn fields(&self) -> &[Array2<f64>] {
        &self.fields
    }

    pub fn field(&self, date: NaiveDate) -> Option<ArrayView2<'_, f64>> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return None;
        }
        self.fields.get(offset as usize).map(|f| f.view())
    }

    /// Copy out the days of `range`. Fails if the series does not cover it.
    pub fn slice(&self, range: &DateRange) -> Result<Self> {
        if range.start() < self.start || range.end() > self.end() {
            return Err(SwampError::ForcingUnavailable(format!(
                "series covers {}..={}, requested {}..={}",
                self.start,
                self.end(),
                range.start(),
                range.end()
            )));
        }
        let offset = (range.start() - self.start).num_days() as usize;
        let fields = self.fields[offset..offset + range.len()].to_vec();
        Ok(Self {
            start: range.start(),
            fields,
        })
    }

    /// Check the series is exactly `range`, day by day, on `grid`.
    pub fn validate(&self, range: &DateRange, grid: &Grid) -> Result<()> {
        if self.start != range.start() {
            return Err(SwampError::ForcingStart {
                expected: range.start(),
                actual: self.start,
            });
        }
        if self.len() != range.len() {
            return Err(SwampError::ForcingLength {
                expected: range.len(),
                actual: self.len(),
            });
        }
        for (date, field) in self.dates().zip(&self.fields) {
            if field.dim() != grid.shape() {
                return Err(SwampError::ForcingShape {
                    date,
                    expected: grid.shape(),
                    actual: field.dim(),
                });
            }
        }
        Ok(())
    }
}

// -- In-memory provider --

/// Forcing provider over a series that is already materialised.
#[derive(Debug, Clone)]
pub struct InMemoryForcing {
    series: ForcingSeries,
}

impl InMemoryForcing {
    pub fn new(series: ForcingSeries) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &ForcingSeries {
        &self.series
    }
}

impl ForcingProvider for InMemoryForcing {
    fn get_forcing(&self, range: &DateRange) -> Result<ForcingSeries> {
        self.series.slice(range)
    }
}

// -- Provider building blocks --

/// Replace missing days with the nearest available day (earlier wins ties).
///
/// Fails when every day is missing.
pub fn fill_missing_nearest(days: Vec<Option<Array2<f64>>>) -> Result<Vec<Array2<f64>>> {
    let available: Vec<usize> = days
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.as_ref().map(|_| i))
        .collect();
    if available.is_empty() {
        return Err(SwampError::ForcingUnavailable(format!(
            "all {} days are missing, nothing to fill from",
            days.len()
        )));
    }
    let n_missing = days.len() - available.len();
    if n_missing > 0 {
        warn!(n_missing, n_days = days.len(), "filling missing forcing days from nearest day");
    }

    let mut filled = Vec::with_capacity(days.len());
    for i in 0..days.len() {
        if let Some(f) = &days[nearest_available(&available, i)] {
            filled.push(f.clone());
        }
    }
    Ok(filled)
}

fn nearest_available(available: &[usize], i: usize) -> usize {
    let k = available.partition_point(|&a| a < i);
    match (k.checked_sub(1).map(|p| available[p]), available.get(k)) {
        (_, Some(&after)) if after == i => i,
        (Some(before), Some(&after)) => {
            if i - before <= after - i {
                before
            } else {
                after
            }
        }
        (Some(before), None) => before,
        (None, Some(&after)) => after,
        (None, None) => i,
    }
}

/// Regrid precipitation and ET onto `grid` and return `P - et_scale * ET` [mm].
///
/// Cells outside either source extent come out NaN.
pub fn precip_minus_et(
    grid: &Grid,
    precip: &GriddedField,
    et: &GriddedField,
    et_scale: f64,
) -> Array2<f64> {
    let p = bilinear(precip, grid);
    let e = bilinear(et, grid);
    debug!(et_scale, shape = ?grid.shape(), "computing P - ET");
    p - e * et_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, d).unwrap()
    }

    fn field(v: f64) -> Array2<f64> {
        Array2::from_elem((2, 2), v)
    }

    // -- DateRange --

    #[test]
    fn range_len_inclusive() {
        assert_eq!(DateRange::new(day(1), day(20)).unwrap().len(), 20);
        assert_eq!(DateRange::new(day(3), day(3)).unwrap().len(), 1);
    }

    #[test]
    fn range_rejects_reversed() {
        let err = DateRange::new(day(2), day(1)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn range_days_cross_month() {
        let start = NaiveDate::from_ymd_opt(2022, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 3, 2).unwrap();
        let days: Vec<_> = DateRange::new(start, end).unwrap().days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
    }

    // -- ForcingSeries construction --

    #[test]
    fn rejects_empty_series() {
        assert!(ForcingSeries::new(day(1), vec![]).is_err());
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let err = ForcingSeries::new(day(1), vec![field(0.0), Array2::zeros((3, 2))]).unwrap_err();
        assert!(matches!(err, SwampError::ForcingShape { .. }));
    }

    #[test]
    fn from_dated_rejects_gap() {
        let err = ForcingSeries::from_dated(vec![(day(1), field(0.0)), (day(3), field(0.0))])
            .unwrap_err();
        assert!(matches!(
            err,
            SwampError::ForcingGap { expected, found } if expected == day(2) && found == day(3)
        ));
        assert!(err.is_data_unavailable());
    }

    #[test]
    fn from_dated_rejects_duplicate_day() {
        let err = ForcingSeries::from_dated(vec![(day(1), field(0.0)), (day(1), field(1.0))]);
        assert!(err.is_err());
    }

    #[test]
    fn from_dated_consecutive() {
        let s = ForcingSeries::from_dated(vec![(day(1), field(1.0)), (day(2), field(2.0))]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.end(), day(2));
        assert_eq!(s.field(day(2)).unwrap()[[0, 0]], 2.0);
        assert!(s.field(day(3)).is_none());
        assert!(s.field(NaiveDate::from_ymd_opt(2022, 4, 30).unwrap()).is_none());
    }

    // -- Slicing and validation --

    #[test]
    fn slice_sub_range() {
        let s = ForcingSeries::new(day(1), (1..=5).map(|v| field(v as f64)).collect()).unwrap();
        let sub = s.slice(&DateRange::new(day(2), day(4)).unwrap()).unwrap();
        assert_eq!(sub.start(), day(2));
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.fields()[0][[0, 0]], 2.0);
    }

    #[test]
    fn slice_outside_fails() {
        let s = ForcingSeries::new(day(1), vec![field(0.0); 3]).unwrap();
        assert!(s.slice(&DateRange::new(day(2), day(4)).unwrap()).is_err());
    }

    #[test]
    fn validate_checks_grid_shape() {
        let grid = Grid::new(array![0.0, 1.0, 2.0], array![0.0, 1.0]).unwrap();
        let s = ForcingSeries::new(day(1), vec![field(0.0)]).unwrap();
        let err = s.validate(&DateRange::new(day(1), day(1)).unwrap(), &grid).unwrap_err();
        assert!(matches!(err, SwampError::ForcingShape { .. }));
    }

    #[test]
    fn validate_checks_length_and_start() {
        let grid = Grid::new(array![0.0, 1.0], array![0.0, 1.0]).unwrap();
        let s = ForcingSeries::new(day(1), vec![field(0.0); 2]).unwrap();
        let long = DateRange::new(day(1), day(3)).unwrap();
        assert!(matches!(s.validate(&long, &grid), Err(SwampError::ForcingLength { .. })));
        let shifted = DateRange::new(day(2), day(3)).unwrap();
        assert!(matches!(s.validate(&shifted, &grid), Err(SwampError::ForcingStart { .. })));
        assert!(s.validate(&DateRange::new(day(1), day(2)).unwrap(), &grid).is_ok());
    }

    // -- Gap filling --

    #[test]
    fn fill_uses_nearest_day() {
        let filled = fill_missing_nearest(vec![
            None,
            Some(field(1.0)),
            None,
            None,
            Some(field(4.0)),
            None,
        ])
        .unwrap();
        let firsts: Vec<f64> = filled.iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![1.0, 1.0, 1.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn fill_tie_prefers_earlier() {
        let filled = fill_missing_nearest(vec![Some(field(1.0)), None, Some(field(3.0))]).unwrap();
        assert_eq!(filled[1][[0, 0]], 1.0);
    }

    #[test]
    fn fill_all_missing_fails() {
        let err = fill_missing_nearest(vec![None, None]).unwrap_err();
        assert!(err.is_data_unavailable());
    }

    // -- P - ET --

    #[test]
    fn precip_minus_scaled_et() {
        let grid = Grid::new(array![0.0, 1.0], array![0.0, 1.0]).unwrap();
        let p = GriddedField::new(array![1.0, 0.0], array![0.0, 1.0], field(10.0)).unwrap();
        let et = GriddedField::new(array![0.0, 1.0], array![0.0, 1.0], field(5.0)).unwrap();
        let d = precip_minus_et(&grid, &p, &et, 1.0);
        assert_eq!(d, field(5.0));
        let scaled = precip_minus_et(&grid, &p, &et, 0.5);
        assert_eq!(scaled, field(7.5));
    }
}
