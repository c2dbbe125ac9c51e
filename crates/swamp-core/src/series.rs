/// Daily soil-moisture output of one integration run.
use chrono::NaiveDate;
use ndarray::{s, Array3};
use rayon::prelude::*;
use swamp_macros::Columns;

use crate::constants::{SM_MAX, SM_MIN};
use crate::field::{Cell, SoilMoistureField};

/// Per-day summary over the defined cells of a field.
///
/// `mean`, `min` and `max` are NaN on a day with no defined cell.
#[derive(Debug, Clone, Copy, PartialEq, Columns)]
pub struct DailyStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub valid_cells: f64,
    pub missing_cells: f64,
    /// Share of defined cells at the upper bound.
    pub saturated_fraction: f64,
    /// Share of defined cells at the lower bound.
    pub dry_fraction: f64,
}

impl DailyStats {
    pub fn from_field(field: &SoilMoistureField) -> Self {
        let (_, missing, n) = cell_counts(field);
        let missing = missing as f64;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut saturated = 0usize;
        let mut dry = 0usize;

        for v in field.defined_values() {
            sum += v;
            min = min.min(v);
            max = max.max(v);
            if v >= SM_MAX {
                saturated += 1;
            }
            if v <= SM_MIN {
                dry += 1;
            }
        }

        if n == 0 {
            return Self {
                mean: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                valid_cells: 0.0,
                missing_cells: missing,
                saturated_fraction: 0.0,
                dry_fraction: 0.0,
            };
        }
        let nf = n as f64;
        Self {
            mean: sum / nf,
            min,
            max,
            valid_cells: nf,
            missing_cells: missing,
            saturated_fraction: saturated as f64 / nf,
            dry_fraction: dry as f64 / nf,
        }
    }
}

/// One [`SoilMoistureField`] per calendar day, starting at `start`.
///
/// Day 0 is the initial condition itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilMoistureSeries {
    start: NaiveDate,
    depth_mm: f64,
    fields: Vec<SoilMoistureField>,
}

impl SoilMoistureSeries {
    pub(crate) fn new(start: NaiveDate, depth_mm: f64, fields: Vec<SoilMoistureField>) -> Self {
        Self {
            start,
            depth_mm,
            fields,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Soil column depth [mm] the run was integrated with.
    pub fn depth_mm(&self) -> f64 {
        self.depth_mm
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

    pub fn fields(&self) -> &[SoilMoistureField] {
        &self.fields
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SoilMoistureField> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return None;
        }
        self.fields.get(offset as usize)
    }

    pub fn last(&self) -> Option<&SoilMoistureField> {
        self.fields.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &SoilMoistureField)> {
        self.dates().zip(&self.fields)
    }

    /// (day, lat, lon) float cube with NaN wherever a cell is undefined.
    pub fn to_array(&self) -> Array3<f64> {
        let (nlat, nlon) = self.fields.first().map_or((0, 0), |f| f.shape());
        let mut out = Array3::from_elem((self.fields.len(), nlat, nlon), f64::NAN);
        for (i, field) in self.fields.iter().enumerate() {
            out.slice_mut(s![i, .., ..])
                .zip_mut_with(field.cells(), |o, c| *o = c.to_f64());
        }
        out
    }

    pub fn daily_stats(&self) -> DailyStatsColumns {
        let rows: Vec<DailyStats> = self.fields.par_iter().map(DailyStats::from_field).collect();
        let mut cols = DailyStatsColumns::with_capacity(rows.len());
        for row in &rows {
            cols.push(row);
        }
        cols
    }
}

impl<'a> IntoIterator for &'a SoilMoistureSeries {
    type Item = &'a SoilMoistureField;
    type IntoIter = std::slice::Iter<'a, SoilMoistureField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// (masked, missing, valid) cell counts for one day.
pub fn cell_counts(field: &SoilMoistureField) -> (usize, usize, usize) {
    field
        .cells()
        .iter()
        .fold((0, 0, 0), |(masked, missing, valid), c| match c {
            Cell::Masked => (masked + 1, missing, valid),
            Cell::Missing => (masked, missing + 1, valid),
            Cell::Value(_) => (masked, missing, valid + 1),
        })
}
