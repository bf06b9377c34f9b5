//! Public-holiday calendar keyed by federal state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::day_type::{DayType, DayTypeSource};
use crate::model::State;

/// Nationwide and state-specific public holidays.
///
/// A holiday is labelled [`DayType::Sunday`] regardless of its weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    nationwide: BTreeSet<NaiveDate>,
    regional: BTreeMap<State, BTreeSet<NaiveDate>>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_nationwide(&mut self, date: NaiveDate) {
        self.nationwide.insert(date);
    }

    pub fn add_regional(&mut self, state: State, date: NaiveDate) {
        self.regional.entry(state).or_default().insert(date);
    }

    pub fn is_holiday(&self, state: State, date: NaiveDate) -> bool {
        self.nationwide.contains(&date)
            || self
                .regional
                .get(&state)
                .is_some_and(|days| days.contains(&date))
    }

    /// Holidays of `state`, nationwide ones included, in ascending order.
    pub fn holidays_of(&self, state: State) -> BTreeSet<NaiveDate> {
        let mut days = self.nationwide.clone();
        if let Some(regional) = self.regional.get(&state) {
            days.extend(regional.iter().copied());
        }
        days
    }

    pub fn len(&self) -> usize {
        self.nationwide.len() + self.regional.values().map(BTreeSet::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DayTypeSource for HolidayCalendar {
    fn day_type(&self, state: State, date: NaiveDate) -> DayType {
        if self.is_holiday(state, date) {
            DayType::Sunday
        } else {
            DayType::of_weekday(date)
        }
    }
}
