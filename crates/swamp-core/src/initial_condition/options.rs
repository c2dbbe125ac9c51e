/// Initial-condition selection and options.
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HRES;
use crate::error::{Result, SwampError};

/// Scatter-to-grid method requested from the interpolation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMethod {
    Linear,
    Nearest,
    Cubic,
    Rbf,
    Barnes,
    Cressman,
    NaturalNeighbor,
}

impl InterpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            InterpMethod::Linear => "linear",
            InterpMethod::Nearest => "nearest",
            InterpMethod::Cubic => "cubic",
            InterpMethod::Rbf => "rbf",
            InterpMethod::Barnes => "barnes",
            InterpMethod::Cressman => "cressman",
            InterpMethod::NaturalNeighbor => "natural_neighbor",
        }
    }
}

impl fmt::Display for InterpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpMethod {
    type Err = SwampError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpMethod::Linear),
            "nearest" => Ok(InterpMethod::Nearest),
            "cubic" => Ok(InterpMethod::Cubic),
            "rbf" => Ok(InterpMethod::Rbf),
            "barnes" => Ok(InterpMethod::Barnes),
            "cressman" => Ok(InterpMethod::Cressman),
            "natural_neighbor" => Ok(InterpMethod::NaturalNeighbor),
            _ => Err(SwampError::UnknownInterpMethod(s.to_string())),
        }
    }
}

/// Options passed through to whichever strategy is selected.
///
/// Ignored by strategies that do no interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcOptions {
    pub method: InterpMethod,
    /// Intermediate lattice spacing [degrees].
    pub hres: f64,
    /// Radial basis function name, only meaningful for `rbf`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbf_func: Option<String>,
    /// Fail instead of producing an all-missing field when no station survives cleaning.
    pub require_stations: bool,
}

impl Default for IcOptions {
    fn default() -> Self {
        Self {
            method: InterpMethod::Rbf,
            hres: DEFAULT_HRES,
            rbf_func: None,
            require_stations: false,
        }
    }
}

impl IcOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.hres.is_finite() && self.hres > 0.0) {
            return Err(SwampError::InvalidParameter {
                name: "hres",
                value: self.hres,
                reason: "must be finite and positive",
            });
        }
        Ok(())
    }
}

/// Which initial condition to use for day 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum IcSelector {
    #[default]
    Zero,
    /// Interpolated 5 cm station readings.
    Crn,
    /// Layer-weighted 5/10/20 cm station readings.
    Awc,
    /// Caller-supplied field, used as-is.
    Field(Array2<f64>),
}

impl IcSelector {
    /// `None` selects the zero field.
    pub fn parse_optional(s: Option<&str>) -> Result<Self> {
        match s {
            None => Ok(IcSelector::Zero),
            Some(s) => s.parse(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IcSelector::Zero => "zero",
            IcSelector::Crn => "crn",
            IcSelector::Awc => "awc",
            IcSelector::Field(_) => "field",
        }
    }
}

impl FromStr for IcSelector {
    type Err = SwampError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "zero" => Ok(IcSelector::Zero),
            "crn" => Ok(IcSelector::Crn),
            "awc" => Ok(IcSelector::Awc),
            _ => Err(SwampError::UnknownIcSelector(s.to_string())),
        }
    }
}

impl From<Array2<f64>> for IcSelector {
    fn from(field: Array2<f64>) -> Self {
        IcSelector::Field(field)
    }
}
