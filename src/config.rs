//! TOML-based run configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calendar::{QUARTERS_PER_DAY, YearClock};
use crate::factors::{ShiftDefinitions, ShiftWindow, Tolerance};
use crate::model::EnergyCarrier;
use crate::runner::{RunOptions, SectorScope};

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`RunConfig::from_toml_file`] or start from a preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Year, scope and stage switches.
    #[serde(default)]
    pub run: RunSection,
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Normalization and balance tolerances.
    #[serde(default)]
    pub tolerance: Tolerance,
    /// Shift windows and residual load.
    #[serde(default)]
    pub shifts: ShiftsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Profile year and efficiency target year.
    pub year: i32,
    /// Year the efficiency curves start from.
    pub base_year: i32,
    /// Restrict to one carrier; absent means every carrier.
    pub carrier: Option<EnergyCarrier>,
    /// `industry`, `cts` or `all`.
    pub scope: SectorScope,
    pub apply_efficiency: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            year: 2020,
            base_year: 2019,
            carrier: None,
            scope: SectorScope::All,
            apply_efficiency: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory of factor CSV sheets.
    pub factors: PathBuf,
    /// Annual consumption CSV.
    pub consumption: PathBuf,
    /// Holiday list; without one only weekends are special days.
    pub holidays: Option<PathBuf>,
    /// Long-format series CSV.
    pub output: PathBuf,
    /// JSON run summary.
    pub summary: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            factors: PathBuf::from("factors"),
            consumption: PathBuf::from("consumption.csv"),
            holidays: None,
            output: PathBuf::from("loadshape.csv"),
            summary: None,
        }
    }
}

/// Active window of one shift pattern as `HH:MM` clock times.
///
/// `end` may be `24:00`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

impl WindowConfig {
    fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Quarter-hour window, or a message naming the bad bound.
    pub fn to_window(&self) -> Result<ShiftWindow, String> {
        let start = parse_quarter(&self.start)?;
        let end = parse_quarter(&self.end)?;
        let window = ShiftWindow::new(start, end);
        if window.is_valid() {
            Ok(window)
        } else {
            Err(format!("{} must be before {}", self.start, self.end))
        }
    }
}

/// Converts `HH:MM` on a quarter-hour boundary into a quarter index.
fn parse_quarter(value: &str) -> Result<usize, String> {
    let (h, m) = value
        .split_once(':')
        .ok_or_else(|| format!("\"{value}\" is not HH:MM"))?;
    let hours: usize = h.parse().map_err(|_| format!("\"{value}\" has an invalid hour"))?;
    let minutes: usize = m
        .parse()
        .map_err(|_| format!("\"{value}\" has an invalid minute"))?;
    if minutes >= 60 || minutes % 15 != 0 {
        return Err(format!("\"{value}\" is not on a quarter-hour"));
    }
    let quarter = hours * 4 + minutes / 15;
    if quarter > QUARTERS_PER_DAY {
        return Err(format!("\"{value}\" is past 24:00"));
    }
    Ok(quarter)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShiftsConfig {
    /// Relative load outside the active window (0.0-1.0).
    pub residual_load: f64,
    pub single: WindowConfig,
    pub double: WindowConfig,
    pub continuous: WindowConfig,
}

impl Default for ShiftsConfig {
    fn default() -> Self {
        Self {
            residual_load: 0.5,
            single: WindowConfig::new("08:00", "16:00"),
            double: WindowConfig::new("06:00", "22:00"),
            continuous: WindowConfig::new("00:00", "24:00"),
        }
    }
}

impl ShiftsConfig {
    /// # Errors
    ///
    /// Returns a `ConfigError` for the first window that does not parse.
    pub fn to_definitions(&self) -> Result<ShiftDefinitions, ConfigError> {
        let window = |name: &str, w: &WindowConfig| {
            w.to_window().map_err(|message| ConfigError {
                field: format!("shifts.{name}"),
                message,
            })
        };
        Ok(ShiftDefinitions {
            single: window("single", &self.single)?,
            double: window("double", &self.double)?,
            continuous: window("continuous", &self.continuous)?,
            residual_load: self.residual_load,
        })
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"run.year"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl RunConfig {
    /// Industry sectors, electricity only.
    pub fn industry_power() -> Self {
        Self {
            run: RunSection {
                carrier: Some(EnergyCarrier::Power),
                scope: SectorScope::Industry,
                ..RunSection::default()
            },
            ..Self::default()
        }
    }

    /// CTS sectors, electricity only.
    pub fn cts_power() -> Self {
        Self {
            run: RunSection {
                carrier: Some(EnergyCarrier::Power),
                scope: SectorScope::Cts,
                ..RunSection::default()
            },
            ..Self::default()
        }
    }

    /// Every sector, gas only.
    pub fn all_gas() -> Self {
        Self {
            run: RunSection {
                carrier: Some(EnergyCarrier::Gas),
                ..RunSection::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["industry_power", "cts_power", "all_gas"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "industry_power" => Ok(Self::industry_power()),
            "cts_power" => Ok(Self::cts_power()),
            "all_gas" => Ok(Self::all_gas()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Pipeline options for this configuration.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            base_year: self.run.base_year,
            apply_efficiency: self.run.apply_efficiency,
            scope: self.run.scope,
            carrier: self.run.carrier,
            ..RunOptions::new(self.run.year)
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let r = &self.run;

        if YearClock::new(r.year).is_err() {
            errors.push(ConfigError {
                field: "run.year".into(),
                message: format!("{} is not a supported calendar year", r.year),
            });
        }
        if r.base_year > r.year {
            errors.push(ConfigError {
                field: "run.base_year".into(),
                message: "must be <= run.year".into(),
            });
        }

        let t = &self.tolerance;
        for (field, value) in [
            ("tolerance.shares", t.shares),
            ("tolerance.profiles", t.profiles),
            ("tolerance.totals", t.totals),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be > 0".into(),
                });
            }
        }

        let s = &self.shifts;
        if !(0.0..=1.0).contains(&s.residual_load) {
            errors.push(ConfigError {
                field: "shifts.residual_load".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        for (name, window) in [
            ("single", &s.single),
            ("double", &s.double),
            ("continuous", &s.continuous),
        ] {
            if let Err(message) = window.to_window() {
                errors.push(ConfigError {
                    field: format!("shifts.{name}"),
                    message,
                });
            }
        }

        if self.paths.output.as_os_str().is_empty() {
            errors.push(ConfigError {
                field: "paths.output".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let errors = RunConfig::default().validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = RunConfig::from_preset("nonexistent");
        assert!(err.is_err_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in RunConfig::PRESETS {
            let cfg = RunConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn presets_restrict_scope_and_carrier() {
        let industry = RunConfig::industry_power();
        assert_eq!(industry.run.scope, SectorScope::Industry);
        assert_eq!(industry.run.carrier, Some(EnergyCarrier::Power));
        let gas = RunConfig::all_gas();
        assert_eq!(gas.run.scope, SectorScope::All);
        assert_eq!(gas.run.carrier, Some(EnergyCarrier::Gas));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[run]
year = 2030
base_year = 2019
carrier = "gas"
scope = "cts"
apply_efficiency = false

[paths]
factors = "data/factors"
consumption = "data/consumption.csv"
holidays = "data/holidays.csv"
output = "out/series.csv"
summary = "out/summary.json"

[tolerance]
totals = 1e-3

[shifts]
residual_load = 0.3
single = { start = "07:00", end = "15:30" }
"#;
        let cfg = RunConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.run.year), Some(2030));
        assert_eq!(cfg.as_ref().map(|c| c.run.scope), Some(SectorScope::Cts));
        assert_eq!(cfg.as_ref().map(|c| c.tolerance.totals), Some(1e-3));
        // untouched tolerance keeps its default
        assert_eq!(cfg.as_ref().map(|c| c.tolerance.shares), Some(1e-6));
        let defs = cfg.as_ref().map(|c| c.shifts.to_definitions());
        assert!(matches!(
            defs,
            Some(Ok(ShiftDefinitions { single, .. })) if single == ShiftWindow::new(28, 62)
        ));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[run]
year = 2020
bogus_field = true
"#;
        assert!(RunConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn default_shifts_match_builtin_definitions() {
        let defs = ShiftsConfig::default().to_definitions();
        assert_eq!(defs.ok(), Some(ShiftDefinitions::default()));
    }

    #[test]
    fn validation_catches_bad_window() {
        let mut cfg = RunConfig::default();
        cfg.shifts.double = WindowConfig::new("22:00", "06:00");
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "shifts.double"));
    }

    #[test]
    fn validation_catches_off_grid_time() {
        assert!(parse_quarter("08:10").is_err());
        assert!(parse_quarter("24:15").is_err());
        assert_eq!(parse_quarter("24:00"), Ok(QUARTERS_PER_DAY));
    }

    #[test]
    fn validation_catches_residual_out_of_range() {
        let mut cfg = RunConfig::default();
        cfg.shifts.residual_load = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "shifts.residual_load"));
    }

    #[test]
    fn validation_catches_base_year_after_year() {
        let mut cfg = RunConfig::default();
        cfg.run.base_year = 2040;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.base_year"));
    }

    #[test]
    fn run_options_follow_config() {
        let cfg = RunConfig::cts_power();
        let opts = cfg.run_options();
        assert_eq!(opts.year, 2020);
        assert_eq!(opts.base_year, 2019);
        assert_eq!(opts.input_year(), 2019);
        assert_eq!(opts.scope, SectorScope::Cts);
        assert!(opts.apply_efficiency);
    }
}
