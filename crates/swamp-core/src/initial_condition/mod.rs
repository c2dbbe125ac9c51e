/// Day-0 soil-moisture strategies.
///
/// Each strategy is a variant of [`InitialCondition`] and is evaluated through
/// the single [`InitialCondition::field`] method. Adding a strategy means adding
/// a variant. Whatever the strategy returns, cells outside the land mask come
/// out `Masked`.
pub mod interpolated;
pub mod options;

use chrono::NaiveDate;
use ndarray::Array2;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::coefficients::CoefficientField;
use crate::error::{Result, SwampError};
use crate::field::{Cell, SoilMoistureField};
use crate::station::SoilDepth;
use crate::traits::{SpatialInterpolator, StationDataProvider};

pub use options::{IcOptions, IcSelector, InterpMethod};

/// Soil layers read by a station strategy and their combination weights.
pub type Layers = SmallVec<[(SoilDepth, f64); 3]>;

/// Everything a strategy may read.
#[derive(Clone, Copy)]
pub struct IcContext<'a> {
    pub coefficients: &'a CoefficientField,
    pub stations: Option<&'a dyn StationDataProvider>,
    pub interpolator: Option<&'a dyn SpatialInterpolator>,
}

impl<'a> IcContext<'a> {
    pub fn new(coefficients: &'a CoefficientField) -> Self {
        Self {
            coefficients,
            stations: None,
            interpolator: None,
        }
    }

    pub fn with_stations(mut self, stations: &'a dyn StationDataProvider) -> Self {
        self.stations = Some(stations);
        self
    }

    pub fn with_interpolator(mut self, interpolator: &'a dyn SpatialInterpolator) -> Self {
        self.interpolator = Some(interpolator);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitialCondition {
    /// 0 everywhere the coefficient is valid.
    Zero,
    /// Interpolated 5 cm readings ("crn").
    StationDirect(IcOptions),
    /// 7.5/7.5/20 weighted 5/10/20 cm readings ("awc").
    StationWeighted(IcOptions),
    /// Caller-supplied field; NaN becomes `Missing`.
    Precomputed(Array2<f64>),
}

impl InitialCondition {
    pub fn from_selector(selector: IcSelector, options: IcOptions) -> Self {
        match selector {
            IcSelector::Zero => InitialCondition::Zero,
            IcSelector::Crn => InitialCondition::StationDirect(options),
            IcSelector::Awc => InitialCondition::StationWeighted(options),
            IcSelector::Field(field) => InitialCondition::Precomputed(field),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InitialCondition::Zero => "zero",
            InitialCondition::StationDirect(_) => "crn",
            InitialCondition::StationWeighted(_) => "awc",
            InitialCondition::Precomputed(_) => "field",
        }
    }

    /// Station columns read by this strategy, with their weights.
    pub fn layers(&self) -> Layers {
        match self {
            InitialCondition::StationDirect(_) => smallvec![(SoilDepth::Cm5, 1.0)],
            InitialCondition::StationWeighted(_) => SoilDepth::ALL
                .iter()
                .map(|&d| (d, d.layer_weight()))
                .collect(),
            InitialCondition::Zero | InitialCondition::Precomputed(_) => SmallVec::new(),
        }
    }

    /// Configuration checks that need no I/O.
    ///
    /// Run before any data is requested so a bad setup fails fast.
    pub fn check(&self, ctx: &IcContext<'_>) -> Result<()> {
        match self {
            InitialCondition::Zero => Ok(()),
            InitialCondition::Precomputed(field) => ctx
                .coefficients
                .grid()
                .check_shape("initial condition", field.dim()),
            InitialCondition::StationDirect(options) | InitialCondition::StationWeighted(options) => {
                options.validate()?;
                if ctx.stations.is_none() {
                    return Err(SwampError::MissingCollaborator {
                        selector: self.name(),
                        collaborator: "station data provider",
                    });
                }
                if ctx.interpolator.is_none() {
                    return Err(SwampError::MissingCollaborator {
                        selector: self.name(),
                        collaborator: "spatial interpolator",
                    });
                }
                Ok(())
            }
        }
    }

    /// Produce the soil-moisture field for `date`.
    pub fn field(&self, ctx: &IcContext<'_>, date: NaiveDate) -> Result<SoilMoistureField> {
        self.check(ctx)?;
        debug!(strategy = self.name(), %date, "computing initial condition");
        match self {
            InitialCondition::Zero => Ok(SoilMoistureField::filled(ctx.coefficients, Cell::Value(0.0))),
            InitialCondition::Precomputed(field) => {
                Ok(SoilMoistureField::from_raw_masked(field.view(), ctx.coefficients))
            }
            InitialCondition::StationDirect(options) | InitialCondition::StationWeighted(options) => {
                interpolated::station_field(ctx, date, options, &self.layers())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use ndarray::array;
    use std::sync::Arc;

    fn coefficients() -> CoefficientField {
        let grid = Arc::new(Grid::new(array![0.0, 1.0], array![0.0, 1.0]).unwrap());
        CoefficientField::new(grid, array![[1.0, 1.0], [1.0, 0.0]]).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, 1).unwrap()
    }

    #[test]
    fn zero_respects_mask() {
        let c = coefficients();
        let f = InitialCondition::Zero.field(&IcContext::new(&c), day()).unwrap();
        assert_eq!(
            f.cells(),
            &array![
                [Cell::Value(0.0), Cell::Value(0.0)],
                [Cell::Value(0.0), Cell::Masked]
            ]
        );
    }

    #[test]
    fn precomputed_used_as_is_then_masked() {
        let c = coefficients();
        let ic = InitialCondition::Precomputed(array![[0.1, f64::NAN], [0.3, 0.4]]);
        let f = ic.field(&IcContext::new(&c), day()).unwrap();
        assert_eq!(f.get(0, 0), Some(Cell::Value(0.1)));
        assert_eq!(f.get(0, 1), Some(Cell::Missing));
        assert_eq!(f.get(1, 0), Some(Cell::Value(0.3)));
        assert_eq!(f.get(1, 1), Some(Cell::Masked));
    }

    #[test]
    fn precomputed_wrong_shape_is_configuration_error() {
        let c = coefficients();
        let ic = InitialCondition::Precomputed(Array2::zeros((3, 3)));
        let err = ic.check(&IcContext::new(&c)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn station_strategies_need_collaborators() {
        let c = coefficients();
        let ic = InitialCondition::from_selector(IcSelector::Crn, IcOptions::default());
        let err = ic.check(&IcContext::new(&c)).unwrap_err();
        assert!(matches!(err, SwampError::MissingCollaborator { selector: "crn", .. }));
    }

    #[test]
    fn layer_sets() {
        let direct = InitialCondition::StationDirect(IcOptions::default()).layers();
        assert_eq!(direct.as_slice(), &[(SoilDepth::Cm5, 1.0)]);
        let weighted = InitialCondition::StationWeighted(IcOptions::default()).layers();
        assert_eq!(
            weighted.as_slice(),
            &[(SoilDepth::Cm5, 7.5), (SoilDepth::Cm10, 7.5), (SoilDepth::Cm20, 20.0)]
        );
        assert!(InitialCondition::Zero.layers().is_empty());
    }
}
