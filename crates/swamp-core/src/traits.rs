/// Collaborator interfaces consumed by the integrator.
///
/// Data acquisition (download, caching, file parsing) lives behind these
/// traits. Implementations must hand back fully materialised data; the
/// integrator never blocks, retries or times out on its own.
use chrono::NaiveDate;

use crate::error::Result;
use crate::forcing::{DateRange, ForcingSeries};
use crate::initial_condition::IcOptions;
use crate::regrid::GriddedField;
use crate::station::{ScatteredPoints, StationObservation};

/// Supplies daily P - ET fields [mm] on the integrator's grid.
pub trait ForcingProvider: Send + Sync {
    /// One field per calendar day in `range`, gaps already filled.
    ///
    /// Fails if any day cannot be resolved after the provider's own gap filling.
    fn get_forcing(&self, range: &DateRange) -> Result<ForcingSeries>;
}

/// Supplies point soil-moisture observations (e.g. USCRN daily files).
pub trait StationDataProvider: Send + Sync {
    /// All station rows for `dates`. Sentinel readings are passed through
    /// unchanged; the caller decides what is invalid.
    fn get_station_data(&self, dates: &[NaiveDate]) -> Result<Vec<StationObservation>>;
}

/// Scatter-to-grid interpolation onto an intermediate lattice.
pub trait SpatialInterpolator: Send + Sync {
    /// Interpolate `points` using `options.method` at `options.hres` degrees.
    ///
    /// `points` is never empty when called from the initial-condition code.
    fn interpolate(&self, points: &ScatteredPoints, options: &IcOptions) -> Result<GriddedField>;
}

impl<T: ForcingProvider + ?Sized> ForcingProvider for std::sync::Arc<T> {
    fn get_forcing(&self, range: &DateRange) -> Result<ForcingSeries> {
        (**self).get_forcing(range)
    }
}
