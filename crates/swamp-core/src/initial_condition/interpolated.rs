/// Station-interpolated initial conditions ("crn" and "awc").
///
/// Per layer: clean the readings, interpolate the scattered points onto the
/// service's lattice, weight, then resample onto the output grid.
use chrono::NaiveDate;
use ndarray::Array2;
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::{IcContext, IcOptions, Layers};
use crate::error::{Result, SwampError};
use crate::field::{Cell, SoilMoistureField};
use crate::grid::Grid;
use crate::regrid::{bilinear, GriddedField};
use crate::station::clean_points;

pub(crate) fn station_field(
    ctx: &IcContext<'_>,
    date: NaiveDate,
    options: &IcOptions,
    layers: &Layers,
) -> Result<SoilMoistureField> {
    let (Some(stations), Some(interpolator)) = (ctx.stations, ctx.interpolator) else {
        return Err(SwampError::MissingCollaborator {
            selector: "station",
            collaborator: "station data provider and spatial interpolator",
        });
    };

    let observations = stations.get_station_data(&[date])?;
    debug!(rows = observations.len(), %date, "station data received");

    let mut gridded: SmallVec<[(GriddedField, f64); 3]> = SmallVec::new();
    for &(depth, weight) in layers {
        let (points, report) = clean_points(&observations, date, depth);
        if points.is_empty() {
            if options.require_stations {
                return Err(SwampError::NoStationData {
                    column: depth.column(),
                    date,
                });
            }
            warn!(
                column = depth.column(),
                %date,
                total = report.total,
                "no valid station readings, initial condition left undefined"
            );
            return Ok(SoilMoistureField::filled(ctx.coefficients, Cell::Missing));
        }

        let lattice = interpolator.interpolate(&points, options)?;
        let lattice = GriddedField::new(lattice.lat, lattice.lon, lattice.values)
            .map_err(|e| SwampError::Interpolation(e.to_string()))?;
        debug!(
            column = depth.column(),
            points = points.len(),
            method = %options.method,
            shape = ?lattice.values.dim(),
            "station layer interpolated"
        );
        gridded.push((lattice, weight));
    }

    let combined = combine_layers(&gridded, ctx.coefficients.grid());
    Ok(SoilMoistureField::from_raw_masked(combined.view(), ctx.coefficients))
}

/// Weighted sum of the layers, resampled onto `grid`.
///
/// Layers on a shared lattice are summed there and resampled once; otherwise
/// each layer is resampled first. Both orders agree because bilinear
/// resampling is linear in the values.
pub(crate) fn combine_layers(layers: &[(GriddedField, f64)], grid: &Grid) -> Array2<f64> {
    let Some((first, _)) = layers.first() else {
        return Array2::from_elem(grid.shape(), f64::NAN);
    };

    if layers.iter().all(|(l, _)| l.same_lattice(first)) {
        let mut values = Array2::zeros(first.values.dim());
        for (layer, weight) in layers {
            values.scaled_add(*weight, &layer.values);
        }
        let summed = GriddedField {
            lat: first.lat.clone(),
            lon: first.lon.clone(),
            values,
        };
        bilinear(&summed, grid)
    } else {
        let mut values = Array2::zeros(grid.shape());
        for (layer, weight) in layers {
            values.scaled_add(*weight, &bilinear(layer, grid));
        }
        values
    }
}
