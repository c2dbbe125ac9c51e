/// Station soil-moisture observations and their cleaning.
///
/// Readings equal to the CRN sentinel (-99) are treated as undefined here,
/// not by the provider. Bad points are dropped one at a time; a run only
/// fails later if nothing usable is left and the caller asked for stations.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{AWC_LAYER_WEIGHTS, CRN_SENTINEL};

/// Measurement depth of a CRN soil-moisture column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilDepth {
    Cm5,
    Cm10,
    Cm20,
}

impl SoilDepth {
    pub const ALL: [SoilDepth; 3] = [SoilDepth::Cm5, SoilDepth::Cm10, SoilDepth::Cm20];

    /// Column name in the USCRN daily01 product.
    pub fn column(self) -> &'static str {
        match self {
            SoilDepth::Cm5 => "SOIL_MOISTURE_5_DAILY",
            SoilDepth::Cm10 => "SOIL_MOISTURE_10_DAILY",
            SoilDepth::Cm20 => "SOIL_MOISTURE_20_DAILY",
        }
    }

    /// Thickness [cm] of the layer this reading represents.
    pub fn layer_weight(self) -> f64 {
        match self {
            SoilDepth::Cm5 => AWC_LAYER_WEIGHTS[0],
            SoilDepth::Cm10 => AWC_LAYER_WEIGHTS[1],
            SoilDepth::Cm20 => AWC_LAYER_WEIGHTS[2],
        }
    }
}

/// One station row for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationObservation {
    pub station_id: u32,
    pub date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub soil_moisture_5cm: Option<f64>,
    pub soil_moisture_10cm: Option<f64>,
    pub soil_moisture_20cm: Option<f64>,
}

impl StationObservation {
    /// Raw reading at `depth`, sentinel included.
    pub fn raw(&self, depth: SoilDepth) -> Option<f64> {
        match depth {
            SoilDepth::Cm5 => self.soil_moisture_5cm,
            SoilDepth::Cm10 => self.soil_moisture_10cm,
            SoilDepth::Cm20 => self.soil_moisture_20cm,
        }
    }

    /// Reading at `depth` with the sentinel and NaN mapped to `None`.
    pub fn soil_moisture(&self, depth: SoilDepth) -> Option<f64> {
        self.raw(depth).filter(|v| *v != CRN_SENTINEL && v.is_finite())
    }
}

/// Cleaned scattered points: x = longitude, y = latitude, v = value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatteredPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub v: Vec<f64>,
}

impl ScatteredPoints {
    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }
}

/// Per-point drop counts from [`clean_points`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub total: usize,
    pub sentinel: usize,
    pub missing_value: usize,
    pub missing_coords: usize,
    pub kept: usize,
}

impl FilterReport {
    pub fn dropped(&self) -> usize {
        self.total - self.kept
    }
}

/// Extract usable (lon, lat, value) triples for `depth` on `date`.
pub fn clean_points(
    observations: &[StationObservation],
    date: NaiveDate,
    depth: SoilDepth,
) -> (ScatteredPoints, FilterReport) {
    let mut points = ScatteredPoints::default();
    let mut report = FilterReport::default();

    for obs in observations.iter().filter(|o| o.date == date) {
        report.total += 1;
        let value = match obs.raw(depth) {
            Some(v) if v == CRN_SENTINEL => {
                report.sentinel += 1;
                continue;
            }
            Some(v) if v.is_finite() => v,
            _ => {
                report.missing_value += 1;
                continue;
            }
        };
        let (Some(lon), Some(lat)) = (
            obs.longitude.filter(|v| v.is_finite()),
            obs.latitude.filter(|v| v.is_finite()),
        ) else {
            report.missing_coords += 1;
            continue;
        };
        points.x.push(lon);
        points.y.push(lat);
        points.v.push(value);
        report.kept += 1;
    }

    if report.dropped() > 0 {
        warn!(
            column = depth.column(),
            %date,
            sentinel = report.sentinel,
            missing_value = report.missing_value,
            missing_coords = report.missing_coords,
            kept = report.kept,
            "dropped invalid station readings"
        );
    }
    (points, report)
}
