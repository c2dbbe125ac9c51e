/// SWAMP numerical constants and data contract.
///
/// Centralises the fixed values shared by the grid, the initial-condition
/// strategies and the integrator.

// -- Water balance --

/// Nominal soil-layer thickness [mm] (top 25 cm).
pub const DEFAULT_DEPTH_MM: f64 = 250.0;

/// Lower clip bound for volumetric soil moisture [m3 m-3].
pub const SM_MIN: f64 = 0.0;

/// Upper clip bound for volumetric soil moisture [m3 m-3].
pub const SM_MAX: f64 = 1.0;

/// ET scale factor applied by some historical SWAMP variants (MJ m-2 to mm).
///
/// Not applied by default; forcing is taken as final P - ET.
pub const LEGACY_ET_SCALE: f64 = 0.408;

// -- CONUS output grid --

/// Number of latitudes in the default grid (~3.8 km spacing).
pub const CONUS_NLAT: usize = 720;

/// Number of longitudes in the default grid (~4.4 km spacing).
pub const CONUS_NLON: usize = 1150;

/// Latitude extent [degrees north], inclusive.
pub const CONUS_LAT_BOUNDS: (f64, f64) = (25.0, 50.0);

/// Longitude extent [degrees east], inclusive.
pub const CONUS_LON_BOUNDS: (f64, f64) = (-125.0, -65.0);

// -- Station data --

/// Out-of-range marker used by CRN daily soil-moisture columns.
pub const CRN_SENTINEL: f64 = -99.0;

/// Layer-thickness weights [cm] for the 5, 10 and 20 cm readings.
pub const AWC_LAYER_WEIGHTS: [f64; 3] = [7.5, 7.5, 20.0];

// -- Interpolation defaults --

/// Default horizontal resolution [degrees] of the intermediate lattice.
pub const DEFAULT_HRES: f64 = 0.1;
