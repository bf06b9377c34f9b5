//! Day-type and season classification.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::State;

/// Label of a calendar day for profile selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Workday,
    Saturday,
    /// Sundays and public holidays.
    Sunday,
}

impl DayType {
    pub const ALL: [DayType; 3] = [Self::Workday, Self::Saturday, Self::Sunday];

    /// Label from the weekday alone, ignoring holidays.
    pub fn of_weekday(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
            _ => Self::Workday,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workday => "workday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load-profile season.
///
/// Winter runs 1 November to 20 March, summer 15 May to 14 September, and
/// the remaining days are transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Summer,
    Transition,
}

impl Season {
    pub const ALL: [Season; 3] = [Self::Winter, Self::Summer, Self::Transition];

    pub fn of(date: NaiveDate) -> Self {
        let md = (date.month(), date.day());
        if md >= (11, 1) || md <= (3, 20) {
            Self::Winter
        } else if ((5, 15)..=(9, 14)).contains(&md) {
            Self::Summer
        } else {
            Self::Transition
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Summer => "summer",
            Self::Transition => "transition",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provides the day-type label of a date in a federal state.
///
/// Implementations must be pure: the same `(state, date)` always yields the
/// same label.
pub trait DayTypeSource: Send + Sync {
    fn day_type(&self, state: State, date: NaiveDate) -> DayType;
}

/// Weekday-only labelling with no public holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl DayTypeSource for WeekendsOnly {
    fn day_type(&self, _state: State, date: NaiveDate) -> DayType {
        DayType::of_weekday(date)
    }
}
