//! Error types for the soil-moisture core.
//!
//! Every failure is either a configuration problem (fatal, never retried) or a
//! data-availability problem (fatal to the current run). Dropped station
//! readings are not errors; they are logged as warnings where they happen.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout `swamp-core`.
pub type Result<T> = std::result::Result<T, SwampError>;

/// Coarse classification of a [`SwampError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid run setup: bad dates, unknown selector, shape mismatch.
    Configuration,
    /// An input collaborator could not supply what the run needs.
    DataUnavailable,
}

#[derive(Debug, Error)]
pub enum SwampError {
    // -- Configuration --
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid `ic` setting {0:?} (expected one of: zero, crn, awc)")]
    UnknownIcSelector(String),

    #[error("unknown interpolation method {0:?}")]
    UnknownInterpMethod(String),

    #[error("{name} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("initial condition {selector:?} requires a {collaborator}")]
    MissingCollaborator {
        selector: &'static str,
        collaborator: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Data availability --
    #[error("forcing provider failed: {0}")]
    ForcingUnavailable(String),

    #[error("forcing series has {actual} days, expected {expected}")]
    ForcingLength { expected: usize, actual: usize },

    #[error("forcing series starts on {actual}, expected {expected}")]
    ForcingStart { expected: NaiveDate, actual: NaiveDate },

    #[error("forcing series is not daily: expected {expected}, found {found}")]
    ForcingGap { expected: NaiveDate, found: NaiveDate },

    #[error("forcing field for {date} has shape {actual:?}, expected {expected:?}")]
    ForcingShape {
        date: NaiveDate,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("station data unavailable: {0}")]
    StationDataUnavailable(String),

    #[error("no valid station readings for {column} on {date}")]
    NoStationData { column: &'static str, date: NaiveDate },

    #[error("spatial interpolation failed: {0}")]
    Interpolation(String),
}

impl SwampError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwampError::InvalidDateRange { .. }
            | SwampError::UnknownIcSelector(_)
            | SwampError::UnknownInterpMethod(_)
            | SwampError::ShapeMismatch { .. }
            | SwampError::InvalidGrid(_)
            | SwampError::InvalidParameter { .. }
            | SwampError::MissingCollaborator { .. }
            | SwampError::InvalidConfig(_)
            | SwampError::Io { .. } => ErrorKind::Configuration,
            SwampError::ForcingUnavailable(_)
            | SwampError::ForcingLength { .. }
            | SwampError::ForcingStart { .. }
            | SwampError::ForcingGap { .. }
            | SwampError::ForcingShape { .. }
            | SwampError::StationDataUnavailable(_)
            | SwampError::NoStationData { .. }
            | SwampError::Interpolation(_) => ErrorKind::DataUnavailable,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn is_data_unavailable(&self) -> bool {
        self.kind() == ErrorKind::DataUnavailable
    }
}
