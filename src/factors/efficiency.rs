//! Efficiency-improvement curves and their lookup table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DisaggError;
use crate::model::{Application, EnergyCarrier, Sector, SectorKind};

/// One compounding phase: `rate` applies to every year up to `until_year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub until_year: i32,
    pub rate: f64,
}

/// Piecewise compounded efficiency curve.
///
/// Phases are ordered by `until_year`. Each applies its rate from the end of
/// the previous phase (or the base year) up to its anchor, and the last
/// phase's rate keeps compounding past its anchor. A negative rate raises
/// consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    base_year: i32,
    phases: Vec<Phase>,
}

impl EfficiencyCurve {
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` if `phases` is empty, its anchors are not
    /// strictly increasing after `base_year`, or a rate is not finite and below 1.
    pub fn new(base_year: i32, phases: Vec<Phase>) -> Result<Self, DisaggError> {
        if phases.is_empty() {
            return Err(DisaggError::malformed("efficiency_rates", "curve without phases"));
        }
        let mut previous = base_year;
        for phase in &phases {
            if phase.until_year <= previous {
                return Err(DisaggError::malformed(
                    "efficiency_rates",
                    format!("anchor year {} must follow {previous}", phase.until_year),
                ));
            }
            if !phase.rate.is_finite() || phase.rate >= 1.0 {
                return Err(DisaggError::malformed(
                    "efficiency_rates",
                    format!("rate {} for anchor {} is not below 1", phase.rate, phase.until_year),
                ));
            }
            previous = phase.until_year;
        }
        Ok(Self { base_year, phases })
    }

    /// Convenience constructor for the usual two-anchor schedule.
    pub fn two_phase(
        base_year: i32,
        first: (i32, f64),
        second: (i32, f64),
    ) -> Result<Self, DisaggError> {
        Self::new(
            base_year,
            vec![
                Phase {
                    until_year: first.0,
                    rate: first.1,
                },
                Phase {
                    until_year: second.0,
                    rate: second.1,
                },
            ],
        )
    }

    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Consumption multiplier for `year`; exactly 1.0 at or before the base year.
    pub fn factor(&self, year: i32) -> f64 {
        let mut factor = 1.0;
        let mut from = self.base_year;
        for phase in &self.phases {
            let end = year.min(phase.until_year);
            if end > from {
                factor *= (1.0 - phase.rate).powi(end - from);
                from = end;
            }
            if year <= phase.until_year {
                return factor;
            }
        }
        if let Some(last) = self.phases.last() {
            if year > from {
                factor *= (1.0 - last.rate).powi(year - from);
            }
        }
        factor
    }
}

/// Which sectors a rate row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RateScope {
    Sector(Sector),
    Kind(SectorKind),
}

/// One anchor row as read from a rate sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRow {
    pub scope: RateScope,
    pub carrier: EnergyCarrier,
    /// `None` applies to every application of the sector.
    pub application: Option<Application>,
    pub until_year: i32,
    pub rate: f64,
}

/// Curves from one rate scope: a sector-wide default and per-application curves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveSet {
    pub default: Option<EfficiencyCurve>,
    pub per_application: BTreeMap<Application, EfficiencyCurve>,
}

impl CurveSet {
    /// Per-application curve first, then the sector-wide one.
    pub fn get(&self, application: Application) -> Option<&EfficiencyCurve> {
        self.per_application
            .get(&application)
            .or(self.default.as_ref())
    }

    fn set(&mut self, application: Option<Application>, curve: EfficiencyCurve) {
        match application {
            Some(app) => {
                self.per_application.insert(app, curve);
            }
            None => self.default = Some(curve),
        }
    }
}

/// Curves for one (sector, carrier).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSchedule {
    /// Rows naming the sector itself.
    pub sector: CurveSet,
    /// Rows for the sector's group (`industry`, `cts`).
    pub group: CurveSet,
}

impl RateSchedule {
    /// Any sector-scoped curve wins over the group, whatever its application.
    pub fn curve_for(&self, application: Application) -> Option<&EfficiencyCurve> {
        self.sector
            .get(application)
            .or_else(|| self.group.get(application))
    }
}

/// Rate schedules per (sector, carrier).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EfficiencyTable {
    schedules: BTreeMap<(Sector, EnergyCarrier), RateSchedule>,
}

impl EfficiencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds schedules from anchor rows.
    ///
    /// Rows sharing scope, carrier and application form one curve. Group rows
    /// (`industry`, `cts`) are expanded to every sector of the group.
    /// Sector-specific rows replace them: a sector row without application
    /// beats a group row for one application.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` for duplicate anchors or invalid curves.
    pub fn from_rows(base_year: i32, rows: &[RateRow]) -> Result<Self, DisaggError> {
        let mut groups: BTreeMap<(RateScope, EnergyCarrier, Option<Application>), Vec<Phase>> =
            BTreeMap::new();
        for row in rows {
            let phases = groups
                .entry((row.scope, row.carrier, row.application))
                .or_default();
            if phases.iter().any(|p| p.until_year == row.until_year) {
                return Err(DisaggError::malformed(
                    "efficiency_rates",
                    format!(
                        "duplicate anchor {} for {:?} ({})",
                        row.until_year, row.scope, row.carrier
                    ),
                ));
            }
            phases.push(Phase {
                until_year: row.until_year,
                rate: row.rate,
            });
        }

        let mut table = Self::new();
        for ((scope, carrier, application), mut phases) in groups {
            phases.sort_by_key(|p| p.until_year);
            let curve = EfficiencyCurve::new(base_year, phases)?;
            match scope {
                RateScope::Kind(kind) => {
                    for sector in Sector::of_kind(kind) {
                        table
                            .entry(sector, carrier)
                            .group
                            .set(application, curve.clone());
                    }
                }
                RateScope::Sector(sector) => {
                    table.entry(sector, carrier).sector.set(application, curve);
                }
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, sector: Sector, carrier: EnergyCarrier, schedule: RateSchedule) {
        self.schedules.insert((sector, carrier), schedule);
    }

    pub fn schedule(&self, sector: Sector, carrier: EnergyCarrier) -> Option<&RateSchedule> {
        self.schedules.get(&(sector, carrier))
    }

    /// Curve for one application.
    ///
    /// # Errors
    ///
    /// Returns `MissingRateSchedule`; `application` is only named when the
    /// sector has a schedule that lacks this application.
    pub fn curve(
        &self,
        sector: Sector,
        carrier: EnergyCarrier,
        application: Application,
    ) -> Result<&EfficiencyCurve, DisaggError> {
        let schedule = self
            .schedule(sector, carrier)
            .ok_or(DisaggError::MissingRateSchedule {
                sector,
                carrier,
                application: None,
            })?;
        schedule
            .curve_for(application)
            .ok_or(DisaggError::MissingRateSchedule {
                sector,
                carrier,
                application: Some(application),
            })
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    fn entry(&mut self, sector: Sector, carrier: EnergyCarrier) -> &mut RateSchedule {
        self.schedules.entry((sector, carrier)).or_default()
    }
}
