//! Quarter-hour output series.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::application::Application;
use super::region::Region;
use super::sector::{EnergyCarrier, Sector};

/// Identifies one output series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub sector: Sector,
    pub region: Region,
    pub carrier: EnergyCarrier,
    pub year: i32,
    pub application: Option<Application>,
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sector {} / region {} / {} / {}",
            self.sector, self.region, self.carrier, self.year
        )?;
        if let Some(app) = self.application {
            write!(f, " / {app}")?;
        }
        Ok(())
    }
}

/// An annual value spread over the quarter-hours of its year.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub key: SeriesKey,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
