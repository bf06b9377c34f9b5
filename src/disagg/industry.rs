//! Spread industry consumption with shift profiles.

use rayon::prelude::*;
use tracing::debug;

use super::outcome::{KeyFailure, Outcome};
use super::shift_profile::ShiftProfileSet;
use crate::error::DisaggError;
use crate::factors::SectorShiftMap;
use crate::model::{AnnualTable, SectorKind, SeriesKey, TimeSeries};

/// Spreads each industry row with the shift column of its sector and state.
///
/// Rows are processed in parallel; output order follows the input key order.
///
/// # Errors (per key)
///
/// * `UnmappedSector` - non-industry sector or sector without shift variant
/// * `UnknownState` - region outside the states of `profiles`
/// * `YearMismatch` - row year differs from the profile year
pub fn temporal_industry(
    consumption: &impl AnnualTable,
    profiles: &ShiftProfileSet,
    sector_shifts: &SectorShiftMap,
) -> Outcome<Vec<TimeSeries>> {
    let inputs = consumption.series_inputs();
    let results: Vec<Result<TimeSeries, KeyFailure>> = inputs
        .par_iter()
        .map(|(key, value)| {
            spread(key, *value, profiles, sector_shifts)
                .map_err(|error| KeyFailure::new(key.sector, key.region, error))
        })
        .collect();

    let mut output = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for r in results {
        match r {
            Ok(series) => output.push(series),
            Err(failure) => failures.push(failure),
        }
    }
    debug!(
        series = output.len(),
        failed = failures.len(),
        "industry disaggregation done"
    );
    Outcome::new(output, failures)
}

fn spread(
    key: &SeriesKey,
    value: f64,
    profiles: &ShiftProfileSet,
    sector_shifts: &SectorShiftMap,
) -> Result<TimeSeries, DisaggError> {
    let unmapped = DisaggError::UnmappedSector { sector: key.sector };
    if key.sector.kind() != SectorKind::Industry {
        return Err(unmapped);
    }
    let variant = sector_shifts.get(key.sector).ok_or(unmapped)?;
    let profile = key
        .region
        .state()
        .and_then(|state| profiles.get(state))
        .ok_or(DisaggError::UnknownState { region: key.region })?;
    if profile.year() != key.year {
        return Err(DisaggError::YearMismatch {
            expected: profile.year(),
            found: key.year,
        });
    }
    Ok(TimeSeries {
        key: *key,
        values: profile
            .column(variant)
            .iter()
            .map(|w| value * w)
            .collect(),
    })
}
