//! Work-shift variants and the industry sector assignment.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::{DayType, QUARTERS_PER_DAY};
use crate::error::{DisaggError, KeyParseError};
use crate::model::{Sector, SectorKind};

/// Number of daily shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftPattern {
    /// S1
    Single,
    /// S2
    Double,
    /// S3
    Continuous,
}

impl ShiftPattern {
    pub const ALL: [ShiftPattern; 3] = [Self::Single, Self::Double, Self::Continuous];

    pub fn code(self) -> &'static str {
        match self {
            Self::Single => "S1",
            Self::Double => "S2",
            Self::Continuous => "S3",
        }
    }
}

/// Which day types a shift variant works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayCoverage {
    /// WT
    Workdays,
    /// WT_SA
    WorkdaysSaturday,
    /// WT_SA_SO
    AllDays,
}

impl DayCoverage {
    pub const ALL: [DayCoverage; 3] = [Self::Workdays, Self::WorkdaysSaturday, Self::AllDays];

    pub fn code(self) -> &'static str {
        match self {
            Self::Workdays => "WT",
            Self::WorkdaysSaturday => "WT_SA",
            Self::AllDays => "WT_SA_SO",
        }
    }

    pub fn covers(self, day: DayType) -> bool {
        match self {
            Self::Workdays => day == DayType::Workday,
            Self::WorkdaysSaturday => day != DayType::Sunday,
            Self::AllDays => true,
        }
    }
}

/// One of the nine shift variants, e.g. `S3_WT_SA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShiftVariant {
    pub pattern: ShiftPattern,
    pub coverage: DayCoverage,
}

impl ShiftVariant {
    pub const fn new(pattern: ShiftPattern, coverage: DayCoverage) -> Self {
        Self { pattern, coverage }
    }

    /// All variants, pattern-major.
    pub fn all() -> impl Iterator<Item = ShiftVariant> {
        ShiftPattern::ALL.into_iter().flat_map(|pattern| {
            DayCoverage::ALL
                .into_iter()
                .map(move |coverage| Self::new(pattern, coverage))
        })
    }

    /// Position in [`ShiftVariant::all`].
    pub fn index(self) -> usize {
        self.pattern as usize * DayCoverage::ALL.len() + self.coverage as usize
    }

    pub fn name(self) -> String {
        format!("{}_{}", self.pattern.code(), self.coverage.code())
    }
}

impl FromStr for ShiftVariant {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .find(|v| v.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| KeyParseError::new("shift variant", s))
    }
}

impl TryFrom<String> for ShiftVariant {
    type Error = KeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ShiftVariant> for String {
    fn from(v: ShiftVariant) -> Self {
        v.name()
    }
}

impl fmt::Display for ShiftVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Active quarter-hours `[start_quarter, end_quarter)` of a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start_quarter: usize,
    pub end_quarter: usize,
}

impl ShiftWindow {
    pub const fn new(start_quarter: usize, end_quarter: usize) -> Self {
        Self {
            start_quarter,
            end_quarter,
        }
    }

    pub fn contains(self, quarter: usize) -> bool {
        (self.start_quarter..self.end_quarter).contains(&quarter)
    }

    pub fn is_valid(self) -> bool {
        self.start_quarter < self.end_quarter && self.end_quarter <= QUARTERS_PER_DAY
    }
}

/// Active windows per shift pattern plus the off-shift load level.
///
/// The defaults are 08:00–16:00 for one shift, 06:00–22:00 for two shifts,
/// the whole day for continuous operation, and a residual load of 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinitions {
    pub single: ShiftWindow,
    pub double: ShiftWindow,
    pub continuous: ShiftWindow,
    /// Relative load outside the active window and on uncovered days.
    pub residual_load: f64,
}

impl Default for ShiftDefinitions {
    fn default() -> Self {
        Self {
            single: ShiftWindow::new(32, 64),
            double: ShiftWindow::new(24, 88),
            continuous: ShiftWindow::new(0, QUARTERS_PER_DAY),
            residual_load: 0.5,
        }
    }
}

impl ShiftDefinitions {
    pub fn window(&self, pattern: ShiftPattern) -> ShiftWindow {
        match pattern {
            ShiftPattern::Single => self.single,
            ShiftPattern::Double => self.double,
            ShiftPattern::Continuous => self.continuous,
        }
    }

    /// Weight of one quarter-hour before normalization.
    pub fn weight(&self, variant: ShiftVariant, day: DayType, quarter: usize) -> f64 {
        if variant.coverage.covers(day) && self.window(variant.pattern).contains(quarter) {
            1.0
        } else {
            self.residual_load
        }
    }

    /// # Errors
    ///
    /// Returns `MalformedFactorTable` for an empty or out-of-day window, or a
    /// residual load outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), DisaggError> {
        for pattern in ShiftPattern::ALL {
            let w = self.window(pattern);
            if !w.is_valid() {
                return Err(DisaggError::malformed(
                    "shift_definitions",
                    format!(
                        "{} window {}..{} is not inside one day",
                        pattern.code(),
                        w.start_quarter,
                        w.end_quarter
                    ),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.residual_load) {
            return Err(DisaggError::malformed(
                "shift_definitions",
                format!("residual load {} outside [0, 1]", self.residual_load),
            ));
        }
        Ok(())
    }
}

/// Industry sector to shift variant.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorShiftMap {
    entries: BTreeMap<Sector, ShiftVariant>,
}

impl SectorShiftMap {
    /// Empty map; see [`SectorShiftMap::builtin`] for the standard assignment.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Standard assignment of every industry sector 5–33.
    pub fn builtin() -> Self {
        use DayCoverage::{AllDays, Workdays, WorkdaysSaturday};
        use ShiftPattern::{Continuous, Double, Single};

        let table: [(u8, ShiftPattern, DayCoverage); 29] = [
            (5, Continuous, WorkdaysSaturday),
            (6, Continuous, WorkdaysSaturday),
            (7, Continuous, WorkdaysSaturday),
            (8, Continuous, WorkdaysSaturday),
            (9, Continuous, WorkdaysSaturday),
            (10, Double, Workdays),
            (11, Continuous, Workdays),
            (12, Continuous, WorkdaysSaturday),
            (13, Double, Workdays),
            (14, Double, Workdays),
            (15, Double, WorkdaysSaturday),
            (16, Double, WorkdaysSaturday),
            (17, Continuous, AllDays),
            (18, Continuous, AllDays),
            (19, Continuous, AllDays),
            (20, Continuous, AllDays),
            (21, Continuous, AllDays),
            (22, Double, WorkdaysSaturday),
            (23, Continuous, AllDays),
            (24, Continuous, AllDays),
            (25, Continuous, Workdays),
            (26, Double, Workdays),
            (27, Double, WorkdaysSaturday),
            (28, Double, Workdays),
            (29, Continuous, Workdays),
            (30, Continuous, AllDays),
            (31, Single, WorkdaysSaturday),
            (32, Continuous, AllDays),
            (33, Double, WorkdaysSaturday),
        ];

        let entries = table
            .into_iter()
            .filter_map(|(code, pattern, coverage)| {
                Sector::new(code)
                    .ok()
                    .map(|s| (s, ShiftVariant::new(pattern, coverage)))
            })
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, sector: Sector, variant: ShiftVariant) -> Option<ShiftVariant> {
        self.entries.insert(sector, variant)
    }

    pub fn get(&self, sector: Sector) -> Option<ShiftVariant> {
        self.entries.get(&sector).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sector, ShiftVariant)> + '_ {
        self.entries.iter().map(|(s, v)| (*s, *v))
    }

    /// Every industry sector must be assigned and no CTS sector may be.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` naming the first offending sector.
    pub fn validate_complete(&self) -> Result<(), DisaggError> {
        if let Some(sector) = self.entries.keys().find(|s| s.kind() != SectorKind::Industry) {
            return Err(DisaggError::malformed(
                "sector_shifts",
                format!("sector {sector} is not an industry sector"),
            ));
        }
        if let Some(sector) =
            Sector::of_kind(SectorKind::Industry).find(|s| !self.entries.contains_key(s))
        {
            return Err(DisaggError::malformed(
                "sector_shifts",
                format!("industry sector {sector} has no shift variant"),
            ));
        }
        Ok(())
    }
}

impl Default for SectorShiftMap {
    fn default() -> Self {
        Self::builtin()
    }
}
