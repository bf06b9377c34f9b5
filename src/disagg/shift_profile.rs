//! Normalized quarter-hour shapes for the nine shift variants.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::calendar::{DayType, DayTypeSource, QUARTERS_PER_DAY, YearClock};
use crate::error::DisaggError;
use crate::factors::{ShiftDefinitions, ShiftVariant};
use crate::model::State;

/// One year of shift-profile columns for one federal state.
///
/// Every column has one weight per quarter-hour of the year and sums to 1.
/// States differ only through their day labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftProfiles {
    state: State,
    year: i32,
    columns: Vec<Vec<f64>>,
}

impl ShiftProfiles {
    /// Builds all nine columns for `state` and `year`.
    ///
    /// Quarter-hours inside the variant's active window on a covered day get
    /// weight 1, everything else gets the residual load; each column is then
    /// scaled to sum to 1.
    ///
    /// # Errors
    ///
    /// Returns `YearOutOfRange` for an unrepresentable year, and
    /// `MalformedFactorTable` if a column has no weight at all.
    pub fn generate(
        state: State,
        year: i32,
        definitions: &ShiftDefinitions,
        days: &dyn DayTypeSource,
    ) -> Result<Self, DisaggError> {
        let clock = YearClock::new(year)?;
        let labels: Vec<DayType> = clock.days().map(|d| days.day_type(state, d)).collect();

        let columns = ShiftVariant::all()
            .map(|variant| build_column(variant, &labels, definitions))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            state,
            year,
            columns,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Quarter-hours per column.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, variant: ShiftVariant) -> &[f64] {
        &self.columns[variant.index()]
    }

    /// Variants with their columns, in [`ShiftVariant::all`] order.
    pub fn columns(&self) -> impl Iterator<Item = (ShiftVariant, &[f64])> {
        ShiftVariant::all().zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Every column must be non-negative and sum to 1 within `tolerance`.
    pub fn validate(&self, tolerance: f64) -> Result<(), DisaggError> {
        for (variant, col) in self.columns() {
            let sum: f64 = col.iter().sum();
            if col.iter().any(|w| *w < 0.0) || (sum - 1.0).abs() > tolerance {
                return Err(DisaggError::malformed(
                    "shift_profiles",
                    format!(
                        "{variant} for {} {} sums to {sum:.9}",
                        self.state, self.year
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn build_column(
    variant: ShiftVariant,
    labels: &[DayType],
    definitions: &ShiftDefinitions,
) -> Result<Vec<f64>, DisaggError> {
    let mut column = Vec::with_capacity(labels.len() * QUARTERS_PER_DAY);
    for day in labels {
        column.extend((0..QUARTERS_PER_DAY).map(|q| definitions.weight(variant, *day, q)));
    }
    let sum: f64 = column.iter().sum();
    if sum <= 0.0 {
        return Err(DisaggError::malformed(
            "shift_definitions",
            format!("{variant} has no load in any quarter-hour"),
        ));
    }
    column.iter_mut().for_each(|w| *w /= sum);
    Ok(column)
}

/// Shift profiles of one year for several states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftProfileSet {
    profiles: BTreeMap<State, ShiftProfiles>,
}

impl ShiftProfileSet {
    /// Generates profiles for `states` in parallel.
    pub fn generate(
        states: &[State],
        year: i32,
        definitions: &ShiftDefinitions,
        days: &dyn DayTypeSource,
    ) -> Result<Self, DisaggError> {
        let profiles = states
            .par_iter()
            .map(|state| {
                ShiftProfiles::generate(*state, year, definitions, days).map(|p| (*state, p))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        debug!(year, states = profiles.len(), "shift profiles generated");
        Ok(Self { profiles })
    }

    /// Profiles for all sixteen states.
    pub fn generate_all(
        year: i32,
        definitions: &ShiftDefinitions,
        days: &dyn DayTypeSource,
    ) -> Result<Self, DisaggError> {
        Self::generate(&State::ALL, year, definitions, days)
    }

    pub fn insert(&mut self, profiles: ShiftProfiles) -> Option<ShiftProfiles> {
        self.profiles.insert(profiles.state(), profiles)
    }

    pub fn get(&self, state: State) -> Option<&ShiftProfiles> {
        self.profiles.get(&state)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl From<ShiftProfiles> for ShiftProfileSet {
    fn from(profiles: ShiftProfiles) -> Self {
        let mut set = Self::default();
        set.insert(profiles);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{HolidayCalendar, WeekendsOnly};
    use crate::factors::{DayCoverage, ShiftPattern};
    use chrono::NaiveDate;

    #[test]
    fn columns_sum_to_one_and_have_year_length() {
        let p = ShiftProfiles::generate(State::HE, 2020, &ShiftDefinitions::default(), &WeekendsOnly)
            .expect("profiles build");
        assert_eq!(p.len(), 35_136);
        assert!(p.validate(1e-6).is_ok());

        let p = ShiftProfiles::generate(State::HE, 2019, &ShiftDefinitions::default(), &WeekendsOnly)
            .expect("profiles build");
        assert_eq!(p.len(), 35_040);
    }

    #[test]
    fn active_window_outweighs_residual() {
        let p = ShiftProfiles::generate(State::BY, 2021, &ShiftDefinitions::default(), &WeekendsOnly)
            .expect("profiles build");
        let v = ShiftVariant::new(ShiftPattern::Single, DayCoverage::Workdays);
        let col = p.column(v);
        // 2021-01-04 is a Monday: 10:00 is active, 03:00 is not
        let monday = 3 * QUARTERS_PER_DAY;
        assert!((col[monday + 40] / col[monday + 12] - 2.0).abs() < 1e-9);
        // 2021-01-02 is a Saturday, uncovered by WT
        let saturday = QUARTERS_PER_DAY;
        assert!((col[saturday + 40] - col[monday + 12]).abs() < 1e-15);
    }

    #[test]
    fn states_differ_only_through_holidays() {
        let mut cal = HolidayCalendar::new();
        cal.add_regional(
            State::HE,
            NaiveDate::from_ymd_opt(2020, 6, 11).expect("valid date"),
        );
        let defs = ShiftDefinitions::default();
        let set = ShiftProfileSet::generate(&[State::HE, State::HB], 2020, &defs, &cal)
            .expect("profiles build");
        let v = ShiftVariant::new(ShiftPattern::Double, DayCoverage::Workdays);
        let he = set.get(State::HE).map(|p| p.column(v).to_vec());
        let hb = set.get(State::HB).map(|p| p.column(v).to_vec());
        assert_ne!(he, hb);
        let fully_covered = ShiftVariant::new(ShiftPattern::Continuous, DayCoverage::AllDays);
        assert_eq!(
            set.get(State::HE).map(|p| p.column(fully_covered).to_vec()),
            set.get(State::HB).map(|p| p.column(fully_covered).to_vec())
        );
    }

    #[test]
    fn zero_residual_on_uncovered_year_is_rejected() {
        // Every day a holiday, residual 0: S1_WT has no load anywhere.
        struct AllHolidays;
        impl DayTypeSource for AllHolidays {
            fn day_type(&self, _: State, _: NaiveDate) -> DayType {
                DayType::Sunday
            }
        }
        let defs = ShiftDefinitions {
            residual_load: 0.0,
            ..ShiftDefinitions::default()
        };
        assert!(ShiftProfiles::generate(State::SH, 2020, &defs, &AllHolidays).is_err());
    }
}
