/// Daily soil-moisture water balance.
///
/// For day i >= 1 and each valid cell:
///
/// ```text
/// delta = c * forcing_i              (weighted)
///       = forcing_i                  (unweighted)
/// sm_i  = clamp((depth * sm_{i-1} + delta) / depth, 0, 1)
/// ```
///
/// Day 0 is the initial condition clamped to [0, 1]. The time loop is
/// sequential; each day's update runs cell-parallel.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use ndarray::{ArrayView2, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::coefficients::CoefficientField;
use crate::config::RunConfig;
use crate::constants::{DEFAULT_DEPTH_MM, SM_MAX, SM_MIN};
use crate::error::{Result, SwampError};
use crate::field::{Cell, SoilMoistureField};
use crate::forcing::DateRange;
use crate::initial_condition::{IcContext, IcOptions, IcSelector, InitialCondition};
use crate::series::SoilMoistureSeries;
use crate::traits::{ForcingProvider, SpatialInterpolator, StationDataProvider};

/// How the forcing is scaled before it enters the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationMode {
    /// `delta = c * forcing`.
    #[default]
    Weighted,
    /// `delta = forcing`; coefficients only provide the mask.
    Unweighted,
}

impl IntegrationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IntegrationMode::Weighted => "weighted",
            IntegrationMode::Unweighted => "unweighted",
        }
    }
}

impl fmt::Display for IntegrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegrationMode {
    type Err = SwampError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(IntegrationMode::Weighted),
            "unweighted" | "smn" => Ok(IntegrationMode::Unweighted),
            _ => Err(SwampError::InvalidConfig(format!(
                "unknown integration mode {s:?} (expected weighted or unweighted)"
            ))),
        }
    }
}

// -- Single-day update --

#[inline]
fn update_cell(prev: Cell, forcing: f64, coefficient: Option<f64>, mode: IntegrationMode, depth_mm: f64) -> Cell {
    let Some(c) = coefficient else {
        return Cell::Masked;
    };
    let Cell::Value(sm) = prev else {
        return prev;
    };
    if forcing.is_nan() {
        return Cell::Missing;
    }
    let delta_mm = match mode {
        IntegrationMode::Weighted => c * forcing,
        IntegrationMode::Unweighted => forcing,
    };
    let raw_mm = depth_mm * sm + delta_mm;
    Cell::from_f64((raw_mm / depth_mm).clamp(SM_MIN, SM_MAX))
}

/// Advance `prev` by one day of `forcing` [mm].
///
/// `forcing` must have the grid's shape; `run` checks this before calling.
pub fn step(
    prev: &SoilMoistureField,
    forcing: ArrayView2<f64>,
    coefficients: &CoefficientField,
    mode: IntegrationMode,
    depth_mm: f64,
) -> SoilMoistureField {
    let cells = Zip::from(prev.cells())
        .and(forcing)
        .and(coefficients.weights())
        .par_map_collect(|&sm, &f, &c| update_cell(sm, f, c, mode, depth_mm));
    SoilMoistureField::from_cells(cells)
}

fn check_depth(depth_mm: f64) -> Result<f64> {
    if !(depth_mm.is_finite() && depth_mm > 0.0) {
        return Err(SwampError::InvalidParameter {
            name: "depth_mm",
            value: depth_mm,
            reason: "must be finite and positive",
        });
    }
    Ok(depth_mm)
}

// -- Integrator --

/// Owns the static inputs of a run and the collaborators it reads from.
///
/// Holds no state between runs: the same integrator and arguments always
/// produce the same series.
#[derive(Clone)]
pub struct Integrator {
    coefficients: Arc<CoefficientField>,
    forcing: Arc<dyn ForcingProvider>,
    stations: Option<Arc<dyn StationDataProvider>>,
    interpolator: Option<Arc<dyn SpatialInterpolator>>,
    mode: IntegrationMode,
    depth_mm: f64,
}

impl fmt::Debug for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integrator")
            .field("grid_shape", &self.coefficients.grid().shape())
            .field("valid_cells", &self.coefficients.valid_count())
            .field("stations", &self.stations.is_some())
            .field("interpolator", &self.interpolator.is_some())
            .field("mode", &self.mode)
            .field("depth_mm", &self.depth_mm)
            .finish()
    }
}

impl Integrator {
    pub fn new(coefficients: Arc<CoefficientField>, forcing: Arc<dyn ForcingProvider>) -> Self {
        Self {
            coefficients,
            forcing,
            stations: None,
            interpolator: None,
            mode: IntegrationMode::default(),
            depth_mm: DEFAULT_DEPTH_MM,
        }
    }

    pub fn with_stations(mut self, stations: Arc<dyn StationDataProvider>) -> Self {
        self.stations = Some(stations);
        self
    }

    pub fn with_interpolator(mut self, interpolator: Arc<dyn SpatialInterpolator>) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    pub fn with_mode(mut self, mode: IntegrationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Soil column depth [mm]. Must be finite and positive.
    pub fn with_depth_mm(mut self, depth_mm: f64) -> Result<Self> {
        self.depth_mm = check_depth(depth_mm)?;
        Ok(self)
    }

    pub fn coefficients(&self) -> &Arc<CoefficientField> {
        &self.coefficients
    }

    pub fn mode(&self) -> IntegrationMode {
        self.mode
    }

    pub fn depth_mm(&self) -> f64 {
        self.depth_mm
    }

    fn ic_context(&self) -> IcContext<'_> {
        IcContext {
            coefficients: &*self.coefficients,
            stations: self.stations.as_deref(),
            interpolator: self.interpolator.as_deref(),
        }
    }

    /// Integrate from `start` to `end`, both included.
    ///
    /// Configuration is checked before any collaborator is called; nothing is
    /// returned unless every day was computed.
    pub fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        selector: IcSelector,
        options: &IcOptions,
    ) -> Result<SoilMoistureSeries> {
        let range = DateRange::new(start, end)?;
        let ic = InitialCondition::from_selector(selector, options.clone());
        let ctx = self.ic_context();
        ic.check(&ctx)?;

        info!(
            %start,
            %end,
            days = range.len(),
            ic = ic.name(),
            mode = %self.mode,
            depth_mm = self.depth_mm,
            "starting soil-moisture run"
        );

        let grid = self.coefficients.grid();
        let forcing = self.forcing.get_forcing(&range)?;
        forcing.validate(&range, grid)?;
        debug!(days = forcing.len(), "forcing validated");

        let raw = ic.field(&ctx, start)?;
        let out_of_range = raw
            .defined_values()
            .filter(|v| !(SM_MIN..=SM_MAX).contains(v))
            .count();
        if out_of_range > 0 {
            debug!(cells = out_of_range, "initial condition clamped to soil-moisture bounds");
        }
        let initial = raw.clipped(SM_MIN, SM_MAX);
        debug!(missing = initial.count_missing(), "initial condition ready");

        let mut fields = Vec::with_capacity(range.len());
        fields.push(initial);
        for (date, day) in forcing.dates().zip(forcing.fields()).skip(1) {
            let nan_cells = Zip::from(day)
                .and(self.coefficients.weights())
                .fold(0usize, |n, f, c| n + usize::from(c.is_some() && f.is_nan()));
            if nan_cells > 0 {
                warn!(%date, cells = nan_cells, "forcing is NaN at valid cells, marking them missing");
            }
            let prev = &fields[fields.len() - 1];
            let next = step(prev, day.view(), &self.coefficients, self.mode, self.depth_mm);
            fields.push(next);
        }

        info!(days = fields.len(), "soil-moisture run finished");
        Ok(SoilMoistureSeries::new(start, self.depth_mm, fields))
    }

    /// Run with the dates, initial condition, mode and depth from `config`.
    ///
    /// The config's mode and depth replace the integrator's for this run.
    pub fn run_config(&self, config: &RunConfig) -> Result<SoilMoistureSeries> {
        let selector = config.validate()?;
        let integrator = self.clone().with_mode(config.mode).with_depth_mm(config.depth_mm)?;
        integrator.run(config.start, config.end, selector, &config.ic_options)
    }
}
