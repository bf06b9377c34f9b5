//! Standard load profiles and the CTS sector assignment.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::{DayType, QUARTERS_PER_DAY, Season};
use crate::error::{DisaggError, KeyParseError};
use crate::model::{Sector, SectorKind, State};

/// BDEW/VDEW standard load profile names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadProfile {
    H0,
    L0,
    L1,
    L2,
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
    G6,
}

impl LoadProfile {
    pub const ALL: [LoadProfile; 11] = [
        Self::H0,
        Self::L0,
        Self::L1,
        Self::L2,
        Self::G0,
        Self::G1,
        Self::G2,
        Self::G3,
        Self::G4,
        Self::G5,
        Self::G6,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::H0 => "H0",
            Self::L0 => "L0",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::G0 => "G0",
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::G3 => "G3",
            Self::G4 => "G4",
            Self::G5 => "G5",
            Self::G6 => "G6",
        }
    }
}

impl FromStr for LoadProfile {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| KeyParseError::new("load profile", s))
    }
}

impl fmt::Display for LoadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of (season, day type) columns in a profile.
pub const SLP_COLUMNS: usize = 9;

/// Column name such as `winter_workday`, season-major.
pub fn column_name(season: Season, day: DayType) -> String {
    format!("{}_{}", season.as_str(), day.as_str())
}

/// Column position of a (season, day type) pair.
pub fn column_index(season: Season, day: DayType) -> usize {
    season.index() * DayType::ALL.len() + day.index()
}

/// Nine daily shapes of 96 quarter-hour weights each.
#[derive(Debug, Clone, PartialEq)]
pub struct SlpShape {
    columns: [[f64; QUARTERS_PER_DAY]; SLP_COLUMNS],
}

impl SlpShape {
    pub fn new(columns: [[f64; QUARTERS_PER_DAY]; SLP_COLUMNS]) -> Self {
        Self { columns }
    }

    /// Same daily shape for every season and day type.
    pub fn uniform(day: [f64; QUARTERS_PER_DAY]) -> Self {
        Self {
            columns: [day; SLP_COLUMNS],
        }
    }

    pub fn column(&self, season: Season, day: DayType) -> &[f64; QUARTERS_PER_DAY] {
        &self.columns[column_index(season, day)]
    }

    pub fn set_column(&mut self, season: Season, day: DayType, weights: [f64; QUARTERS_PER_DAY]) {
        self.columns[column_index(season, day)] = weights;
    }

    /// Every column must be non-negative and sum to 1 within `tolerance`.
    pub fn validate(&self, profile: LoadProfile, tolerance: f64) -> Result<(), DisaggError> {
        for season in Season::ALL {
            for day in DayType::ALL {
                let col = self.column(season, day);
                let name = column_name(season, day);
                if col.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(DisaggError::malformed(
                        "slp_profiles",
                        format!("{profile} {name} has a negative or non-finite weight"),
                    ));
                }
                let sum: f64 = col.iter().sum();
                if (sum - 1.0).abs() > tolerance {
                    return Err(DisaggError::malformed(
                        "slp_profiles",
                        format!("{profile} {name} sums to {sum:.9}, expected 1"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Shapes per load profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlpTable {
    shapes: BTreeMap<LoadProfile, SlpShape>,
}

impl SlpTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: LoadProfile, shape: SlpShape) -> Option<SlpShape> {
        self.shapes.insert(profile, shape)
    }

    pub fn get(&self, profile: LoadProfile) -> Option<&SlpShape> {
        self.shapes.get(&profile)
    }

    pub fn profiles(&self) -> impl Iterator<Item = LoadProfile> + '_ {
        self.shapes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn validate(&self, tolerance: f64) -> Result<(), DisaggError> {
        self.shapes
            .iter()
            .try_for_each(|(profile, shape)| shape.validate(*profile, tolerance))
    }
}

/// CTS sector to load profile, with per-state overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorSlpMap {
    defaults: BTreeMap<Sector, LoadProfile>,
    overrides: BTreeMap<(State, Sector), LoadProfile>,
}

impl SectorSlpMap {
    pub fn new() -> Self {
        Self {
            defaults: BTreeMap::new(),
            overrides: BTreeMap::new(),
        }
    }

    /// Standard assignment of every CTS sector.
    pub fn builtin() -> Self {
        use LoadProfile::{G0, G1, G2, G3, G4, G6, H0, L0};

        let groups: [(LoadProfile, &[u8]); 8] = [
            (L0, &[1, 2]),
            (
                G3,
                &[3, 35, 36, 37, 38, 39, 49, 50, 51, 52, 60, 61, 62, 63, 80, 81, 82, 86],
            ),
            (
                G1,
                &[
                    41, 42, 43, 46, 58, 64, 65, 66, 68, 69, 70, 71, 72, 73, 74, 75, 78, 84, 85, 96,
                ],
            ),
            (G4, &[45, 53, 77, 79, 95]),
            (G0, &[47, 59, 88, 90]),
            (G2, &[55, 56, 87, 91, 92, 93]),
            (G6, &[94]),
            (H0, &[97, 98, 99]),
        ];

        let defaults = groups
            .iter()
            .flat_map(|(profile, codes)| codes.iter().map(move |c| (*c, *profile)))
            .filter_map(|(code, profile)| Sector::new(code).ok().map(|s| (s, profile)))
            .collect();
        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    pub fn set_default(&mut self, sector: Sector, profile: LoadProfile) -> Option<LoadProfile> {
        self.defaults.insert(sector, profile)
    }

    pub fn set_override(
        &mut self,
        state: State,
        sector: Sector,
        profile: LoadProfile,
    ) -> Option<LoadProfile> {
        self.overrides.insert((state, sector), profile)
    }

    /// State override first, then the default mapping.
    pub fn resolve(&self, state: State, sector: Sector) -> Option<LoadProfile> {
        self.overrides
            .get(&(state, sector))
            .or_else(|| self.defaults.get(&sector))
            .copied()
    }

    /// Every CTS sector needs a default and no industry sector may have one.
    pub fn validate_complete(&self) -> Result<(), DisaggError> {
        let industry = self
            .defaults
            .keys()
            .chain(self.overrides.keys().map(|(_, s)| s))
            .find(|s| s.kind() != SectorKind::Cts);
        if let Some(sector) = industry {
            return Err(DisaggError::malformed(
                "sector_slp",
                format!("sector {sector} is not a CTS sector"),
            ));
        }
        if let Some(sector) = Sector::of_kind(SectorKind::Cts).find(|s| !self.defaults.contains_key(s))
        {
            return Err(DisaggError::malformed(
                "sector_slp",
                format!("CTS sector {sector} has no load profile"),
            ));
        }
        Ok(())
    }

    /// Every referenced profile must have a shape in `table`.
    pub fn validate_against(&self, table: &SlpTable) -> Result<(), DisaggError> {
        let missing = self
            .defaults
            .values()
            .chain(self.overrides.values())
            .find(|p| table.get(**p).is_none());
        match missing {
            Some(profile) => Err(DisaggError::malformed(
                "slp_profiles",
                format!("profile {profile} is referenced but not defined"),
            )),
            None => Ok(()),
        }
    }
}

impl Default for SectorSlpMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> [f64; QUARTERS_PER_DAY] {
        [1.0 / QUARTERS_PER_DAY as f64; QUARTERS_PER_DAY]
    }

    #[test]
    fn builtin_covers_every_cts_sector() {
        let map = SectorSlpMap::builtin();
        assert!(map.validate_complete().is_ok());
        let s1 = Sector::new(1).expect("valid sector");
        assert_eq!(map.resolve(State::HE, s1), Some(LoadProfile::L0));
    }

    #[test]
    fn override_wins_in_its_state_only() {
        let mut map = SectorSlpMap::builtin();
        let s47 = Sector::new(47).expect("valid sector");
        map.set_override(State::BY, s47, LoadProfile::G5);
        assert_eq!(map.resolve(State::BY, s47), Some(LoadProfile::G5));
        assert_eq!(map.resolve(State::HE, s47), Some(LoadProfile::G0));
    }

    #[test]
    fn industry_sector_has_no_profile() {
        let map = SectorSlpMap::builtin();
        let s20 = Sector::new(20).expect("valid sector");
        assert_eq!(map.resolve(State::HE, s20), None);
    }

    #[test]
    fn column_layout_is_season_major() {
        assert_eq!(column_index(Season::Winter, DayType::Workday), 0);
        assert_eq!(column_index(Season::Winter, DayType::Sunday), 2);
        assert_eq!(column_index(Season::Transition, DayType::Sunday), 8);
        assert_eq!(column_name(Season::Summer, DayType::Saturday), "summer_saturday");
    }

    #[test]
    fn shape_validation() {
        let shape = SlpShape::uniform(flat());
        assert!(shape.validate(LoadProfile::G0, 1e-6).is_ok());

        let mut bad = shape.clone();
        let mut col = flat();
        col[0] += 0.01;
        bad.set_column(Season::Summer, DayType::Sunday, col);
        assert!(bad.validate(LoadProfile::G0, 1e-6).is_err());
    }

    #[test]
    fn unresolved_reference_is_reported() {
        let map = SectorSlpMap::builtin();
        let mut table = SlpTable::new();
        table.insert(LoadProfile::G0, SlpShape::uniform(flat()));
        assert!(map.validate_against(&table).is_err());
    }
}
