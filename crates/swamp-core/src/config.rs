//! Run configuration loaded from TOML.
//!
//! ```toml
//! start = "2020-09-01"
//! end = "2020-09-30"
//! ic = "crn"
//! mode = "weighted"
//! depth_mm = 250.0
//!
//! [ic_options]
//! method = "rbf"
//! hres = 0.1
//! ```
//!
//! Dates are ISO strings. Everything except `start` and `end` is optional.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DEPTH_MM;
use crate::error::{Result, SwampError};
use crate::forcing::DateRange;
use crate::initial_condition::{IcOptions, IcSelector};
use crate::integrator::IntegrationMode;

fn default_depth_mm() -> f64 {
    DEFAULT_DEPTH_MM
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Initial-condition selector; absent means the zero field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ic: Option<String>,
    #[serde(default)]
    pub mode: IntegrationMode,
    #[serde(default = "default_depth_mm")]
    pub depth_mm: f64,
    #[serde(default)]
    pub ic_options: IcOptions,
}

impl RunConfig {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            ic: None,
            mode: IntegrationMode::default(),
            depth_mm: DEFAULT_DEPTH_MM,
            ic_options: IcOptions::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SwampError::InvalidConfig(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SwampError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SwampError::InvalidConfig(e.to_string()))
    }

    /// Check the dates first, then resolve the selector and options.
    pub fn validate(&self) -> Result<IcSelector> {
        DateRange::new(self.start, self.end)?;
        let selector = IcSelector::parse_optional(self.ic.as_deref())?;
        self.ic_options.validate()?;
        Ok(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initial_condition::InterpMethod;

    #[test]
    fn parses_full_config() {
        let cfg = RunConfig::from_toml_str(
            r#"
            start = "2020-09-01"
            end = "2020-09-30"
            ic = "awc"
            mode = "unweighted"
            depth_mm = 100.0

            [ic_options]
            method = "barnes"
            hres = 0.25
            require_stations = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2020, 9, 1).unwrap());
        assert_eq!(cfg.ic.as_deref(), Some("awc"));
        assert_eq!(cfg.mode, IntegrationMode::Unweighted);
        assert_eq!(cfg.depth_mm, 100.0);
        assert_eq!(cfg.ic_options.method, InterpMethod::Barnes);
        assert_eq!(cfg.ic_options.hres, 0.25);
        assert!(cfg.ic_options.require_stations);
        assert_eq!(cfg.validate().unwrap(), IcSelector::Awc);
    }

    #[test]
    fn defaults_apply() {
        let cfg = RunConfig::from_toml_str("start = \"2021-01-01\"\nend = \"2021-01-02\"\n").unwrap();
        assert_eq!(cfg, RunConfig::new(cfg.start, cfg.end));
        assert_eq!(cfg.validate().unwrap(), IcSelector::Zero);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut cfg = RunConfig::new(
            NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 6, 10).unwrap(),
        );
        cfg.ic = Some("crn".to_string());
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(RunConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = RunConfig::from_toml_str("start = \"2021-01-01\"\nend = \"2021-01-02\"\ndepth = 3\n").unwrap_err();
        assert!(matches!(err, SwampError::InvalidConfig(_)));
    }

    #[test]
    fn validation_order() {
        let mut cfg = RunConfig::from_toml_str("start = \"2021-01-05\"\nend = \"2021-01-02\"\nic = \"bogus\"\n").unwrap();
        assert!(matches!(cfg.validate().unwrap_err(), SwampError::InvalidDateRange { .. }));
        cfg.end = cfg.start;
        assert!(matches!(cfg.validate().unwrap_err(), SwampError::UnknownIcSelector(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RunConfig::from_path("/nonexistent/swamp-run.toml").unwrap_err();
        assert!(matches!(err, SwampError::Io { .. }));
        assert!(err.is_configuration());
    }
}
