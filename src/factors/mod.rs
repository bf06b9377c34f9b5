//! Static factor tables and the validated store that owns them.
//!
//! A [`FactorStore`] is built once from [`FactorTables`] and passed by
//! reference to every stage. It is read-only after construction.

pub mod efficiency;
pub mod shares;
pub mod shifts;
pub mod slp;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use efficiency::{
    CurveSet, EfficiencyCurve, EfficiencyTable, Phase, RateRow, RateSchedule, RateScope,
};
pub use shares::{ProcessHeatBands, SelfGeneration, ShareTable, ShareVector};
pub use shifts::{
    DayCoverage, SectorShiftMap, ShiftDefinitions, ShiftPattern, ShiftVariant, ShiftWindow,
};
pub use slp::{LoadProfile, SectorSlpMap, SlpShape, SlpTable};

use crate::error::DisaggError;

/// Numerical tolerances for normalization and total-preservation checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerance {
    /// Absolute tolerance on share-vector sums.
    pub shares: f64,
    /// Absolute tolerance on profile column sums.
    pub profiles: f64,
    /// Relative tolerance on output totals.
    pub totals: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            shares: 1e-6,
            profiles: 1e-6,
            totals: 1e-4,
        }
    }
}

/// Unvalidated tables as delivered by a factor provider.
#[derive(Debug, Clone, Default)]
pub struct FactorTables {
    pub shares: ShareTable,
    pub process_heat_bands: ProcessHeatBands,
    pub efficiency: EfficiencyTable,
    pub self_generation: SelfGeneration,
    pub shifts: ShiftDefinitions,
    pub sector_shifts: SectorShiftMap,
    pub slp: SlpTable,
    pub sector_slp: SectorSlpMap,
}

/// Validated, immutable factor tables.
#[derive(Debug, Clone)]
pub struct FactorStore {
    shares: ShareTable,
    efficiency: EfficiencyTable,
    self_generation: SelfGeneration,
    shifts: ShiftDefinitions,
    sector_shifts: SectorShiftMap,
    slp: SlpTable,
    sector_slp: SectorSlpMap,
    tolerance: Tolerance,
}

impl FactorStore {
    /// Validates `tables` and blends industry process heat into temperature bands.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` if shares or profile columns do not sum
    /// to 1 within tolerance, a mapping is incomplete, or a mapping references
    /// a profile the SLP table does not define.
    pub fn load(tables: FactorTables, tolerance: Tolerance) -> Result<Self, DisaggError> {
        tables.process_heat_bands.validate(tolerance.shares)?;
        let shares = tables
            .shares
            .blend_process_heat(&tables.process_heat_bands)?;
        shares.validate(tolerance.shares)?;
        tables.self_generation.validate()?;
        tables.shifts.validate()?;
        tables.sector_shifts.validate_complete()?;
        tables.slp.validate(tolerance.profiles)?;
        tables.sector_slp.validate_complete()?;
        if !tables.slp.is_empty() {
            tables.sector_slp.validate_against(&tables.slp)?;
        }

        debug!(
            share_vectors = shares.len(),
            rate_schedules = tables.efficiency.len(),
            load_profiles = tables.slp.len(),
            "factor tables validated"
        );

        Ok(Self {
            shares,
            efficiency: tables.efficiency,
            self_generation: tables.self_generation,
            shifts: tables.shifts,
            sector_shifts: tables.sector_shifts,
            slp: tables.slp,
            sector_slp: tables.sector_slp,
            tolerance,
        })
    }

    /// Share vectors with industry process heat already split into bands.
    pub fn shares(&self) -> &ShareTable {
        &self.shares
    }

    pub fn efficiency(&self) -> &EfficiencyTable {
        &self.efficiency
    }

    pub fn self_generation(&self) -> &SelfGeneration {
        &self.self_generation
    }

    pub fn shifts(&self) -> &ShiftDefinitions {
        &self.shifts
    }

    pub fn sector_shifts(&self) -> &SectorShiftMap {
        &self.sector_shifts
    }

    pub fn slp(&self) -> &SlpTable {
        &self.slp
    }

    pub fn sector_slp(&self) -> &SectorSlpMap {
        &self.sector_slp
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}
