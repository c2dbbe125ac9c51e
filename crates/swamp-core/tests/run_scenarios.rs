//! End-to-end runs through the public API with in-process collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use ndarray::{array, Array1, Array2};
use swamp_core::forcing::{fill_missing_nearest, precip_minus_et};
use swamp_core::grid::linspace;
use swamp_core::metrics::{rmse, station_pairs, unzip_pairs};
use swamp_core::regrid::GriddedField;
use swamp_core::station::{ScatteredPoints, SoilDepth, StationObservation};
use swamp_core::{
    Cell, CoefficientField, DateRange, ForcingProvider, ForcingSeries, Grid, IcOptions, IcSelector,
    InMemoryForcing, IntegrationMode, Integrator, Result, RunConfig, SpatialInterpolator,
    StationDataProvider, SwampError,
};

const COEFFICIENTS: &str = "\
# 3 x 4 test mask
1.0  1.0    1.0  1.0
1.0 -21.52  1.0  0.0

1.0  1.0    1.0  1.0
";

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 9, d).unwrap()
}

fn grid() -> Arc<Grid> {
    Arc::new(Grid::new(array![30.0, 35.0, 40.0], array![-110.0, -100.0, -90.0, -80.0]).unwrap())
}

fn coefficients() -> Arc<CoefficientField> {
    Arc::new(CoefficientField::from_text(grid(), COEFFICIENTS).unwrap())
}

fn filled_forcing(days: Vec<Option<f64>>) -> Arc<InMemoryForcing> {
    let shape = grid().shape();
    let fields = fill_missing_nearest(
        days.into_iter()
            .map(|d| d.map(|v| Array2::from_elem(shape, v)))
            .collect(),
    )
    .unwrap();
    Arc::new(InMemoryForcing::new(ForcingSeries::new(day(1), fields).unwrap()))
}

struct Stations(Vec<StationObservation>);

impl StationDataProvider for Stations {
    fn get_station_data(&self, dates: &[NaiveDate]) -> Result<Vec<StationObservation>> {
        Ok(self.0.iter().filter(|o| dates.contains(&o.date)).cloned().collect())
    }
}

struct Offline;

impl StationDataProvider for Offline {
    fn get_station_data(&self, _dates: &[NaiveDate]) -> Result<Vec<StationObservation>> {
        Err(SwampError::StationDataUnavailable("daily01 archive unreachable".to_string()))
    }
}

/// Inverse-distance weighting onto a lattice covering the test grid.
struct InverseDistance;

impl SpatialInterpolator for InverseDistance {
    fn interpolate(&self, points: &ScatteredPoints, options: &IcOptions) -> Result<GriddedField> {
        let n_lat = ((50.0 - 25.0) / options.hres).round() as usize + 1;
        let n_lon = ((-65.0 - -125.0) / options.hres).round() as usize + 1;
        let lat: Array1<f64> = linspace(25.0, 50.0, n_lat);
        let lon: Array1<f64> = linspace(-125.0, -65.0, n_lon);
        let mut values = Array2::zeros((n_lat, n_lon));
        for ((i, j), v) in values.indexed_iter_mut() {
            let (mut num, mut den) = (0.0, 0.0);
            for k in 0..points.len() {
                let d2 = (points.y[k] - lat[i]).powi(2) + (points.x[k] - lon[j]).powi(2);
                if d2 == 0.0 {
                    num = points.v[k];
                    den = 1.0;
                    break;
                }
                num += points.v[k] / d2;
                den += 1.0 / d2;
            }
            *v = num / den;
        }
        GriddedField::new(lat, lon, values)
    }
}

struct CountingForcing {
    inner: Arc<InMemoryForcing>,
    calls: AtomicUsize,
}

impl ForcingProvider for CountingForcing {
    fn get_forcing(&self, range: &DateRange) -> Result<ForcingSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_forcing(range)
    }
}

fn station(id: u32, lat: f64, lon: f64, sm: [f64; 3]) -> StationObservation {
    StationObservation {
        station_id: id,
        date: day(1),
        latitude: Some(lat),
        longitude: Some(lon),
        soil_moisture_5cm: Some(sm[0]),
        soil_moisture_10cm: Some(sm[1]),
        soil_moisture_20cm: Some(sm[2]),
    }
}

fn coarse() -> IcOptions {
    IcOptions {
        hres: 5.0,
        ..IcOptions::default()
    }
}

fn assert_masked(field: &swamp_core::SoilMoistureField) {
    assert_eq!(field.get(1, 1), Some(Cell::Masked));
    assert_eq!(field.get(1, 3), Some(Cell::Masked));
}

#[test]
fn crn_run_with_gap_filled_forcing() {
    let stations = Stations(vec![
        station(1, 31.0, -108.0, [0.3, 0.0, 0.0]),
        station(2, 38.0, -85.0, [0.3, 0.0, 0.0]),
        station(3, 36.0, -95.0, [-99.0, 0.0, 0.0]),
    ]);
    let forcing = filled_forcing(vec![Some(12.5), Some(12.5), None, Some(12.5), Some(12.5)]);
    let integrator = Integrator::new(coefficients(), forcing)
        .with_stations(Arc::new(stations))
        .with_interpolator(Arc::new(InverseDistance));

    let series = integrator.run(day(1), day(5), IcSelector::Crn, &coarse()).unwrap();
    assert_eq!(series.len(), 5);

    for (i, field) in series.fields().iter().enumerate() {
        assert_masked(field);
        let expected = 0.3 + 0.05 * i as f64;
        for v in field.defined_values() {
            assert_relative_eq!(v, expected, epsilon = 1e-9);
        }
        assert_eq!(field.defined_values().count(), 10);
    }

    let stats = series.daily_stats();
    assert_relative_eq!(stats.mean[4], 0.5, epsilon = 1e-9);
    assert_eq!(stats.valid_cells, vec![10.0; 5]);

    let cube = series.to_array();
    assert_eq!(cube.dim(), (5, 3, 4));
    assert!(cube[[2, 1, 1]].is_nan());
}

#[test]
fn awc_initial_condition_is_clamped_to_saturation() {
    // 7.5 * 0.1 + 7.5 * 0.2 + 20 * 0.3 = 8.25 mm-equivalent before clamping
    let stations = Stations(vec![
        station(1, 31.0, -108.0, [0.1, 0.2, 0.3]),
        station(2, 39.0, -82.0, [0.1, 0.2, 0.3]),
    ]);
    let integrator = Integrator::new(coefficients(), filled_forcing(vec![Some(0.0); 3]))
        .with_stations(Arc::new(stations))
        .with_interpolator(Arc::new(InverseDistance));

    let series = integrator.run(day(1), day(3), IcSelector::Awc, &coarse()).unwrap();
    assert_eq!(series.len(), 3);
    for field in &series {
        assert_masked(field);
        assert_eq!(field.defined_values().count(), 10);
        assert!(field.defined_values().all(|v| v == 1.0));
    }
    assert_eq!(series.daily_stats().saturated_fraction, vec![1.0; 3]);
}

#[test]
fn station_outage_is_data_unavailable() {
    let integrator = Integrator::new(coefficients(), filled_forcing(vec![Some(1.0); 2]))
        .with_stations(Arc::new(Offline))
        .with_interpolator(Arc::new(InverseDistance));
    let err = integrator.run(day(1), day(2), IcSelector::Crn, &coarse()).unwrap_err();
    assert!(err.is_data_unavailable());
}

#[test]
fn config_driven_unweighted_run() {
    let config = RunConfig::from_toml_str(
        r#"
        start = "2020-09-01"
        end = "2020-09-03"
        mode = "unweighted"
        depth_mm = 125.0
        "#,
    )
    .unwrap();
    let integrator = Integrator::new(coefficients(), filled_forcing(vec![Some(25.0); 3]));
    let series = integrator.run_config(&config).unwrap();

    assert_eq!(series.depth_mm(), 125.0);
    let last = series.last().unwrap();
    assert_masked(last);
    assert!(last.defined_values().all(|v| (v - 0.4).abs() < 1e-12));
    // the integrator's own settings are untouched
    assert_eq!(integrator.mode(), IntegrationMode::Weighted);
}

#[test]
fn unknown_selector_in_config_never_reaches_forcing() {
    let config = RunConfig {
        ic: Some("bogus".to_string()),
        ..RunConfig::new(day(1), day(3))
    };
    let forcing = Arc::new(CountingForcing {
        inner: filled_forcing(vec![Some(1.0); 3]),
        calls: AtomicUsize::new(0),
    });
    let err = Integrator::new(coefficients(), forcing.clone())
        .run_config(&config)
        .unwrap_err();
    assert!(matches!(err, SwampError::UnknownIcSelector(ref s) if s == "bogus"));
    assert!(err.is_configuration());
    assert_eq!(forcing.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn precip_minus_et_forcing_feeds_a_run() {
    let g = grid();
    // raster order: latitude north to south
    let precip = GriddedField::new(
        array![50.0, 25.0],
        array![-125.0, -65.0],
        Array2::from_elem((2, 2), 10.0),
    )
    .unwrap();
    let et = GriddedField::new(
        array![25.0, 50.0],
        array![-125.0, -65.0],
        Array2::from_elem((2, 2), 4.0),
    )
    .unwrap();
    let daily = precip_minus_et(&g, &precip, &et, 0.5);
    assert!(daily.iter().all(|v| (v - 8.0).abs() < 1e-12));

    let series = ForcingSeries::from_dated(vec![(day(1), daily.clone()), (day(2), daily)]).unwrap();
    let integrator = Integrator::new(coefficients(), Arc::new(InMemoryForcing::new(series)))
        .with_depth_mm(80.0)
        .unwrap();
    let out = integrator.run(day(1), day(2), IcSelector::Zero, &IcOptions::default()).unwrap();
    assert!(out.fields()[1].defined_values().all(|v| (v - 0.1).abs() < 1e-12));
}

#[test]
fn validation_against_stations() {
    let obs = vec![
        station(1, 30.0, -110.0, [0.2, 0.0, 0.0]),
        station(2, 40.0, -80.0, [0.2, 0.0, 0.0]),
        station(3, 35.0, -100.0, [0.2, 0.0, 0.0]),
    ];
    let integrator = Integrator::new(coefficients(), filled_forcing(vec![Some(0.0)]));
    let series = integrator
        .run(day(1), day(1), IcSelector::Field(Array2::from_elem((3, 4), 0.2)), &IcOptions::default())
        .unwrap();

    // station 3 sits on the masked cell
    let pairs = station_pairs(&series.fields()[0], &grid(), &obs, day(1), SoilDepth::Cm5);
    assert_eq!(pairs.len(), 2);
    let (o, s) = unzip_pairs(&pairs);
    assert_relative_eq!(rmse(&o, &s), 0.0);
}
