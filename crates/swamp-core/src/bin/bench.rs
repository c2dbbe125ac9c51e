/// Pure Rust core benchmarks for the soil-moisture integrator.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for data generation,
/// and std::hint::black_box to prevent dead-code elimination.
///
/// Set `RUST_LOG=swamp_core=debug` to see per-run logging.
use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use ndarray::Array2;
use swamp_core::integrator::step;
use swamp_core::{
    Cell, CoefficientField, ForcingSeries, Grid, IcOptions, IcSelector, InMemoryForcing,
    IntegrationMode, Integrator, SoilMoistureField,
};
use tracing_subscriber::EnvFilter;

const REPEATS: usize = 7;

/// Simple LCG PRNG for deterministic data generation.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as f64 / (1u64 << 31) as f64
    }
}

/// Coefficients in [0.2, 2.0] with roughly 30% of cells masked (negative fill).
fn make_coefficients(grid: Arc<Grid>, seed: u64) -> CoefficientField {
    let mut rng = Lcg(seed);
    let raw = Array2::from_shape_simple_fn(grid.shape(), || {
        if rng.next_f64() < 0.3 {
            -21.52
        } else {
            0.2 + rng.next_f64() * 1.8
        }
    });
    CoefficientField::new(grid, raw).unwrap()
}

/// Daily P - ET in [-6, 14] mm.
fn make_forcing(shape: (usize, usize), days: usize, seed: u64) -> Vec<Array2<f64>> {
    let mut rng = Lcg(seed);
    (0..days)
        .map(|_| Array2::from_shape_simple_fn(shape, || -6.0 + rng.next_f64() * 20.0))
        .collect()
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench_step(shapes: &[(usize, usize)]) -> Vec<(&'static str, String, Duration)> {
    let mut results = Vec::new();
    for &(nlat, nlon) in shapes {
        let grid = Arc::new(Grid::regular((25.0, 50.0), nlat, (-125.0, -65.0), nlon).unwrap());
        let coefficients = make_coefficients(grid, 42);
        let prev = SoilMoistureField::filled(&coefficients, Cell::Value(0.3));
        let forcing = make_forcing((nlat, nlon), 1, 7).remove(0);

        // Warmup
        black_box(step(&prev, forcing.view(), &coefficients, IntegrationMode::Weighted, 250.0));

        let dur = median_time(|| {
            black_box(step(&prev, forcing.view(), &coefficients, IntegrationMode::Weighted, 250.0));
        });
        results.push(("step", format!("{nlat}x{nlon}"), dur));
    }
    results
}

fn bench_run(shapes: &[(usize, usize)], days: usize) -> Vec<(&'static str, String, Duration)> {
    let start = NaiveDate::from_ymd_opt(2020, 9, 1).unwrap();
    let end = start + chrono::Days::new(days as u64 - 1);
    let mut results = Vec::new();

    for &(nlat, nlon) in shapes {
        let grid = Arc::new(Grid::regular((25.0, 50.0), nlat, (-125.0, -65.0), nlon).unwrap());
        let coefficients = Arc::new(make_coefficients(grid, 42));
        let series = ForcingSeries::new(start, make_forcing((nlat, nlon), days, 7)).unwrap();
        let integrator = Integrator::new(coefficients, Arc::new(InMemoryForcing::new(series)));
        let options = IcOptions::default();

        // Warmup
        black_box(integrator.run(start, end, IcSelector::Zero, &options).ok());

        let dur = median_time(|| {
            black_box(integrator.run(start, end, IcSelector::Zero, &options).ok());
        });
        results.push(("run", format!("{nlat}x{nlon}x{days}d"), dur));
    }
    results
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("Pure Rust Core Benchmarks");
    println!("============================================================");
    println!("{:<10} {:>18}   {:>12}", "Stage", "Size", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results: Vec<(&str, String, Duration)> = Vec::new();

    all_results.extend(bench_step(&[(180, 288), (360, 575), (720, 1150)]));
    all_results.extend(bench_run(&[(180, 288), (720, 1150)], 30));

    for (stage, size, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<10} {:>18}      {:>8.2}", stage, size, ms);
    }

    println!("============================================================");
}
