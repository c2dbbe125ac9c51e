/// swamp-core: daily gridded soil-moisture water balance.
///
/// Integrates precipitation-minus-evapotranspiration forcing into a bounded
/// soil-moisture field over a lat/lon grid, starting from a selectable initial
/// condition. Data acquisition sits behind the traits in [`traits`].
pub mod coefficients;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod forcing;
pub mod grid;
pub mod initial_condition;
pub mod integrator;
pub mod metrics;
pub mod regrid;
pub mod series;
pub mod station;
pub mod traits;

pub use coefficients::CoefficientField;
pub use config::RunConfig;
pub use error::{ErrorKind, Result, SwampError};
pub use field::{Cell, SoilMoistureField};
pub use forcing::{DateRange, ForcingSeries, InMemoryForcing};
pub use grid::Grid;
pub use initial_condition::{IcOptions, IcSelector, InitialCondition, InterpMethod};
pub use integrator::{IntegrationMode, Integrator};
pub use series::{DailyStats, DailyStatsColumns, SoilMoistureSeries};
pub use traits::{ForcingProvider, SpatialInterpolator, StationDataProvider};
