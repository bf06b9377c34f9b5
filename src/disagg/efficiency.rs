//! Rescale per-application consumption to a target year.

use tracing::debug;

use super::outcome::{KeyFailure, Outcome};
use crate::error::DisaggError;
use crate::factors::EfficiencyTable;
use crate::model::{AdjustedConsumption, ConsumptionByApplication, ConsumptionKey};

/// Applies each application's efficiency factor for `target_year`.
///
/// Output rows are re-keyed to `target_year`. Every input row must carry the
/// base year of its curve, so no two inputs land on the same output key. A
/// key with any application lacking a curve, or from another year, is dropped
/// as a whole and reported once. Totals are not renormalized.
pub fn apply_efficiency(
    consumption: &ConsumptionByApplication,
    table: &EfficiencyTable,
    target_year: i32,
) -> Outcome<AdjustedConsumption> {
    let mut output = AdjustedConsumption::new();
    let mut failures = Vec::new();

    for key in consumption.keys() {
        match adjust_key(consumption, table, &key, target_year) {
            Ok(rows) => output.extend_from(rows),
            Err(error) => failures.push(KeyFailure::new(key.sector, key.region, error)),
        }
    }

    debug!(
        target_year,
        rows = output.len(),
        failed = failures.len(),
        "efficiency adjustment done"
    );
    Outcome::new(output, failures)
}

fn adjust_key(
    consumption: &ConsumptionByApplication,
    table: &EfficiencyTable,
    key: &ConsumptionKey,
    target_year: i32,
) -> Result<ConsumptionByApplication, DisaggError> {
    let target = key.with_year(target_year);
    let mut rows = ConsumptionByApplication::new();
    for (app, value) in consumption.applications_of(key) {
        let curve = table.curve(key.sector, key.carrier, app)?;
        if curve.base_year() != key.year {
            return Err(DisaggError::YearMismatch {
                expected: curve.base_year(),
                found: key.year,
            });
        }
        rows.add(target, app, value * curve.factor(target_year));
    }
    Ok(rows)
}
