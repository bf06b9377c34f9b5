//! Error taxonomy for factor loading and disaggregation.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{Application, EnergyCarrier, Region, Sector, State};

/// Errors raised by the disaggregation engine.
///
/// `MalformedFactorTable` is a load-time error and aborts a run. Every other
/// variant is raised per key and is collected next to the successful output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisaggError {
    #[error("malformed factor table `{table}`: {reason}")]
    MalformedFactorTable { table: &'static str, reason: String },

    #[error("no application shares for sector {sector} ({carrier})")]
    UnknownSector {
        sector: Sector,
        carrier: EnergyCarrier,
    },

    #[error("sector {sector} has no shift assignment")]
    UnmappedSector { sector: Sector },

    #[error("region {region} does not resolve to a federal state with a profile")]
    UnknownState { region: Region },

    #[error("sector {sector} has no standard load profile for {state}")]
    UnknownSlp { sector: Sector, state: State },

    #[error("no efficiency rate schedule for sector {sector} ({carrier}){}", application_suffix(.application))]
    MissingRateSchedule {
        sector: Sector,
        carrier: EnergyCarrier,
        application: Option<Application>,
    },

    #[error("{key}: expected total {expected:.6}, got {actual:.6} (relative error {relative_error:.2e})")]
    ToleranceViolation {
        key: String,
        expected: f64,
        actual: f64,
        relative_error: f64,
    },

    #[error("expected consumption year {expected}, found {found}")]
    YearMismatch { expected: i32, found: i32 },

    #[error("year {year} is outside the supported calendar range")]
    YearOutOfRange { year: i32 },
}

fn application_suffix(application: &Option<Application>) -> String {
    match application {
        Some(app) => format!(", application {app}"),
        None => String::new(),
    }
}

impl DisaggError {
    /// Shorthand for a load-time validation failure.
    pub fn malformed(table: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedFactorTable {
            table,
            reason: reason.into(),
        }
    }
}

/// A reference-data code that could not be parsed or is outside its closed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} `{value}`")]
pub struct KeyParseError {
    pub kind: &'static str,
    pub value: String,
}

impl KeyParseError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Errors raised while reading or writing tabular data.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV in `{origin}`: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("`{origin}` row {row}: {message}")]
    Row {
        origin: String,
        row: u64,
        message: String,
    },

    #[error(transparent)]
    Disagg(#[from] DisaggError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(origin: &str, source: csv::Error) -> Self {
        Self::Csv {
            origin: origin.to_string(),
            source,
        }
    }

    pub(crate) fn row(origin: &str, row: u64, message: impl Into<String>) -> Self {
        Self::Row {
            origin: origin.to_string(),
            row,
            message: message.into(),
        }
    }
}

pub type Result<T, E = DisaggError> = std::result::Result<T, E>;
