//! Loads factor tables from a directory of CSV sheets.
//!
//! Only `application_shares.csv` is required. Missing optional sheets leave
//! the corresponding table empty or, for the sector mappings, at the
//! built-in assignment.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::read_rows_from_path;
use crate::calendar::QUARTERS_PER_DAY;
use crate::factors::slp::SLP_COLUMNS;
use crate::error::{DisaggError, LoadError};
use crate::factors::{
    EfficiencyTable, FactorStore, FactorTables, LoadProfile, ProcessHeatBands, RateRow, RateScope,
    SectorShiftMap, SectorSlpMap, SelfGeneration, ShareTable, ShiftDefinitions, ShiftVariant,
    SlpShape, SlpTable, Tolerance,
};
use crate::model::{Application, EnergyCarrier, Region, Sector, SectorKind, State};

pub const SHARES_FILE: &str = "application_shares.csv";
pub const BANDS_FILE: &str = "process_heat_bands.csv";
pub const EFFICIENCY_FILE: &str = "efficiency_rates.csv";
pub const SLP_FILE: &str = "slp_profiles.csv";
pub const SECTOR_SLP_FILE: &str = "sector_slp.csv";
pub const SELF_GENERATION_FILE: &str = "self_generation.csv";
pub const SECTOR_SHIFTS_FILE: &str = "sector_shifts.csv";

/// Wildcard state in `sector_slp.csv`.
const ANY_STATE: &str = "*";

#[derive(Debug, Deserialize)]
struct ShareRow {
    sector: Sector,
    carrier: EnergyCarrier,
    application: Application,
    share: f64,
}

#[derive(Debug, Deserialize)]
struct BandRow {
    sector: Sector,
    application: Application,
    share: f64,
}

#[derive(Debug, Deserialize)]
struct EfficiencyRow {
    sectors: String,
    carrier: EnergyCarrier,
    application: Option<Application>,
    until_year: i32,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct SlpRow {
    profile: LoadProfile,
    quarter: usize,
    winter_workday: f64,
    winter_saturday: f64,
    winter_sunday: f64,
    summer_workday: f64,
    summer_saturday: f64,
    summer_sunday: f64,
    transition_workday: f64,
    transition_saturday: f64,
    transition_sunday: f64,
}

impl SlpRow {
    /// Weights in season-major column order.
    fn weights(&self) -> [f64; SLP_COLUMNS] {
        [
            self.winter_workday,
            self.winter_saturday,
            self.winter_sunday,
            self.summer_workday,
            self.summer_saturday,
            self.summer_sunday,
            self.transition_workday,
            self.transition_saturday,
            self.transition_sunday,
        ]
    }
}

#[derive(Debug, Deserialize)]
struct SectorSlpRow {
    state: String,
    sector: Sector,
    profile: LoadProfile,
}

#[derive(Debug, Deserialize)]
struct SelfGenerationRow {
    region: Region,
    share: f64,
}

#[derive(Debug, Deserialize)]
struct SectorShiftRow {
    sector: Sector,
    variant: ShiftVariant,
}

/// Reads every sheet in `dir` into unvalidated tables.
///
/// Shift definitions stay at their defaults; callers replace them from the
/// run configuration.
///
/// # Errors
///
/// Returns `LoadError` if the shares sheet is missing, a sheet cannot be
/// parsed, or a row is inconsistent with its sheet.
pub fn load_factor_dir(dir: &Path, base_year: i32) -> Result<FactorTables, LoadError> {
    let path = dir.join(SHARES_FILE);
    let shares = read_shares(&path)?;

    let tables = FactorTables {
        shares,
        process_heat_bands: optional(dir, BANDS_FILE, read_bands)?.unwrap_or_default(),
        efficiency: optional(dir, EFFICIENCY_FILE, |p| read_efficiency(p, base_year))?
            .unwrap_or_default(),
        self_generation: optional(dir, SELF_GENERATION_FILE, read_self_generation)?
            .unwrap_or_default(),
        shifts: ShiftDefinitions::default(),
        sector_shifts: optional(dir, SECTOR_SHIFTS_FILE, read_sector_shifts)?.unwrap_or_default(),
        slp: optional(dir, SLP_FILE, read_slp)?.unwrap_or_default(),
        sector_slp: optional(dir, SECTOR_SLP_FILE, read_sector_slp)?.unwrap_or_default(),
    };
    info!(
        dir = %dir.display(),
        share_vectors = tables.shares.len(),
        rate_schedules = tables.efficiency.len(),
        load_profiles = tables.slp.len(),
        "factor directory read"
    );
    Ok(tables)
}

/// Reads and validates a factor directory in one step.
pub fn load_factor_store(
    dir: &Path,
    base_year: i32,
    shifts: ShiftDefinitions,
    tolerance: Tolerance,
) -> Result<FactorStore, LoadError> {
    let tables = FactorTables {
        shifts,
        ..load_factor_dir(dir, base_year)?
    };
    Ok(FactorStore::load(tables, tolerance)?)
}

fn optional<T>(
    dir: &Path,
    name: &str,
    read: impl FnOnce(&Path) -> Result<T, LoadError>,
) -> Result<Option<T>, LoadError> {
    let path = dir.join(name);
    if !path.is_file() {
        debug!(file = name, "optional factor sheet not present");
        return Ok(None);
    }
    read(&path).map(Some)
}

fn origin(path: &Path) -> String {
    path.display().to_string()
}

/// Header line plus zero-based row index.
fn line(i: usize) -> u64 {
    i as u64 + 2
}

fn read_shares(path: &Path) -> Result<ShareTable, LoadError> {
    let rows: Vec<ShareRow> = read_rows_from_path(path)?;
    let mut table = ShareTable::new();
    for (i, row) in rows.into_iter().enumerate() {
        if table
            .insert(row.sector, row.carrier, row.application, row.share)
            .is_some()
        {
            return Err(LoadError::row(
                &origin(path),
                line(i),
                format!(
                    "duplicate share for sector {} {} {}",
                    row.sector, row.carrier, row.application
                ),
            ));
        }
    }
    Ok(table)
}

fn read_bands(path: &Path) -> Result<ProcessHeatBands, LoadError> {
    let rows: Vec<BandRow> = read_rows_from_path(path)?;
    let mut bands = ProcessHeatBands::new();
    for (i, row) in rows.into_iter().enumerate() {
        if bands.insert(row.sector, row.application, row.share).is_some() {
            return Err(LoadError::row(
                &origin(path),
                line(i),
                format!("duplicate band {} for sector {}", row.application, row.sector),
            ));
        }
    }
    Ok(bands)
}

fn read_efficiency(path: &Path, base_year: i32) -> Result<EfficiencyTable, LoadError> {
    let rows: Vec<EfficiencyRow> = read_rows_from_path(path)?;
    let rate_rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let scope = parse_scope(&row.sectors).ok_or_else(|| {
                LoadError::row(&origin(path), line(i), format!("invalid sectors `{}`", row.sectors))
            })?;
            Ok(RateRow {
                scope,
                carrier: row.carrier,
                application: row.application,
                until_year: row.until_year,
                rate: row.rate,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;
    Ok(EfficiencyTable::from_rows(base_year, &rate_rows)?)
}

fn parse_scope(value: &str) -> Option<RateScope> {
    if let Ok(kind) = value.parse::<SectorKind>() {
        return Some(RateScope::Kind(kind));
    }
    value.parse::<Sector>().ok().map(RateScope::Sector)
}

fn read_slp(path: &Path) -> Result<SlpTable, LoadError> {
    let rows: Vec<SlpRow> = read_rows_from_path(path)?;
    let mut columns: BTreeMap<LoadProfile, [[Option<f64>; QUARTERS_PER_DAY]; SLP_COLUMNS]> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        if row.quarter >= QUARTERS_PER_DAY {
            return Err(LoadError::row(
                &origin(path),
                line(i),
                format!("quarter {} outside 0..{QUARTERS_PER_DAY}", row.quarter),
            ));
        }
        let shape = columns
            .entry(row.profile)
            .or_insert([[None; QUARTERS_PER_DAY]; SLP_COLUMNS]);
        for (col, weight) in row.weights().into_iter().enumerate() {
            if shape[col][row.quarter].replace(weight).is_some() {
                return Err(LoadError::row(
                    &origin(path),
                    line(i),
                    format!("duplicate quarter {} for {}", row.quarter, row.profile),
                ));
            }
        }
    }

    let mut table = SlpTable::new();
    for (profile, shape) in columns {
        let mut filled = [[0.0; QUARTERS_PER_DAY]; SLP_COLUMNS];
        for (col, quarters) in shape.iter().enumerate() {
            for (q, weight) in quarters.iter().enumerate() {
                filled[col][q] = weight.ok_or_else(|| {
                    DisaggError::malformed("slp_profiles", format!("{profile} is missing quarter {q}"))
                })?;
            }
        }
        table.insert(profile, SlpShape::new(filled));
    }
    Ok(table)
}

fn read_sector_slp(path: &Path) -> Result<SectorSlpMap, LoadError> {
    let rows: Vec<SectorSlpRow> = read_rows_from_path(path)?;
    let mut map = SectorSlpMap::builtin();
    for (i, row) in rows.into_iter().enumerate() {
        if row.state == ANY_STATE {
            map.set_default(row.sector, row.profile);
        } else {
            let state: State = row
                .state
                .parse()
                .map_err(|e| LoadError::row(&origin(path), line(i), format!("{e}")))?;
            map.set_override(state, row.sector, row.profile);
        }
    }
    Ok(map)
}

fn read_self_generation(path: &Path) -> Result<SelfGeneration, LoadError> {
    let rows: Vec<SelfGenerationRow> = read_rows_from_path(path)?;
    let mut table = SelfGeneration::new();
    for (i, row) in rows.into_iter().enumerate() {
        if table.insert(row.region, row.share).is_some() {
            return Err(LoadError::row(
                &origin(path),
                line(i),
                format!("duplicate region {}", row.region),
            ));
        }
    }
    Ok(table)
}

fn read_sector_shifts(path: &Path) -> Result<SectorShiftMap, LoadError> {
    let rows: Vec<SectorShiftRow> = read_rows_from_path(path)?;
    let mut map = SectorShiftMap::builtin();
    for row in rows {
        map.insert(row.sector, row.variant);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).expect("write fixture");
    }

    #[test]
    fn missing_shares_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            load_factor_dir(dir.path(), 2019),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn optional_sheets_fall_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            SHARES_FILE,
            "sector,carrier,application,share\n47,power,lighting,1.0\n",
        );
        let tables = load_factor_dir(dir.path(), 2019).expect("loads");
        assert_eq!(tables.shares.len(), 1);
        assert!(tables.slp.is_empty());
        assert!(tables.efficiency.is_empty());
        assert_eq!(tables.sector_slp, SectorSlpMap::builtin());
    }

    #[test]
    fn efficiency_scope_accepts_groups_and_codes() {
        assert_eq!(parse_scope("industry"), Some(RateScope::Kind(SectorKind::Industry)));
        assert_eq!(
            parse_scope("47"),
            Sector::new(47).ok().map(RateScope::Sector)
        );
        assert_eq!(parse_scope("4"), None);
    }

    #[test]
    fn empty_application_means_sector_wide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(EFFICIENCY_FILE);
        fs::write(
            &path,
            "sectors,carrier,application,until_year,rate\nindustry,power,,2035,0.01\n",
        )
        .expect("write fixture");
        let table = read_efficiency(&path, 2019).expect("loads");
        let sector = Sector::new(5).expect("valid sector");
        assert!(table.curve(sector, EnergyCarrier::Power, Application::Lighting).is_ok());
    }

    #[test]
    fn incomplete_slp_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SLP_FILE);
        let header = "profile,quarter,winter_workday,winter_saturday,winter_sunday,summer_workday,summer_saturday,summer_sunday,transition_workday,transition_saturday,transition_sunday\n";
        fs::write(&path, format!("{header}G0,0,1,1,1,1,1,1,1,1,1\n")).expect("write fixture");
        assert!(matches!(
            read_slp(&path),
            Err(LoadError::Disagg(DisaggError::MalformedFactorTable { .. }))
        ));
    }

    #[test]
    fn sector_slp_overrides_builtin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SECTOR_SLP_FILE);
        fs::write(&path, "state,sector,profile\nHE,47,G4\n*,94,G0\n").expect("write fixture");
        let map = read_sector_slp(&path).expect("loads");
        let s47 = Sector::new(47).expect("valid sector");
        let s94 = Sector::new(94).expect("valid sector");
        assert_eq!(map.resolve(State::HE, s47), Some(LoadProfile::G4));
        assert_eq!(map.resolve(State::BY, s47), Some(LoadProfile::G0));
        assert_eq!(map.resolve(State::BY, s94), Some(LoadProfile::G0));
    }
}
