//! Reader for annual consumption tables.
//!
//! Layout: `sector,region,year,carrier,value`, one row per key, values in MWh.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::{read_rows, read_rows_from_path};
use crate::error::LoadError;
use crate::model::{AnnualConsumption, ConsumptionKey, EnergyCarrier, Region, Sector};

#[derive(Debug, Deserialize)]
struct ConsumptionRow {
    sector: Sector,
    region: Region,
    year: i32,
    carrier: EnergyCarrier,
    value: f64,
}

/// Reads a consumption table from any reader.
///
/// # Errors
///
/// Returns `LoadError` for unparseable rows, unknown codes, non-finite
/// values, or a key that appears twice.
pub fn read_consumption(reader: impl Read, origin: &str) -> Result<AnnualConsumption, LoadError> {
    build(read_rows(reader, origin)?, origin)
}

/// Reads a consumption CSV file.
pub fn read_consumption_file(path: &Path) -> Result<AnnualConsumption, LoadError> {
    build(read_rows_from_path(path)?, &path.display().to_string())
}

fn build(rows: Vec<ConsumptionRow>, origin: &str) -> Result<AnnualConsumption, LoadError> {
    let mut table = AnnualConsumption::new();
    for (i, row) in rows.into_iter().enumerate() {
        // Header is line 1.
        let line = i as u64 + 2;
        if !row.value.is_finite() {
            return Err(LoadError::row(origin, line, format!("value {} is not finite", row.value)));
        }
        let key = ConsumptionKey::new(row.sector, row.region, row.year, row.carrier);
        if table.insert(key, row.value).is_some() {
            return Err(LoadError::row(
                origin,
                line,
                format!(
                    "duplicate key sector {} region {} year {} {}",
                    key.sector, key.region, key.year, key.carrier
                ),
            ));
        }
    }
    Ok(table)
}
