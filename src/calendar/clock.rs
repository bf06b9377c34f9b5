//! Quarter-hour clock over one calendar year.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::DisaggError;

/// Quarter-hours in one day.
pub const QUARTERS_PER_DAY: usize = 96;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> usize {
    if is_leap_year(year) { 366 } else { 365 }
}

/// 35,040 in common years, 35,136 in leap years.
pub fn quarters_in_year(year: i32) -> usize {
    days_in_year(year) * QUARTERS_PER_DAY
}

/// A clock that steps through every quarter-hour of one year.
///
/// # Examples
///
/// ```
/// use loadshape::calendar::YearClock;
///
/// let mut clock = YearClock::new(2021).expect("year in range");
/// let mut steps = 0;
/// clock.run(|_, _| steps += 1);
/// assert_eq!(steps, 35_040);
/// ```
#[derive(Debug, Clone)]
pub struct YearClock {
    /// Midnight of 1 January
    start: NaiveDateTime,
    /// Next quarter-hour index to hand out
    current: usize,
    /// Quarter-hours in the year
    total: usize,
}

impl YearClock {
    /// Creates a clock positioned at 1 January 00:00 of `year`.
    ///
    /// # Errors
    ///
    /// Returns `YearOutOfRange` if the year cannot be represented.
    pub fn new(year: i32) -> Result<Self, DisaggError> {
        let start = first_day(year)?.and_time(chrono::NaiveTime::MIN);
        Ok(Self {
            start,
            current: 0,
            total: quarters_in_year(year),
        })
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Advances the clock by one quarter-hour.
    ///
    /// # Returns
    ///
    /// * `Some((index, timestamp))` - The quarter-hour before advancing
    /// * `None` - If the year is exhausted
    pub fn tick(&mut self) -> Option<(usize, NaiveDateTime)> {
        if self.current < self.total {
            let step = self.current;
            self.current += 1;
            Some((step, self.timestamp_at(step)))
        } else {
            None
        }
    }

    /// Runs `f` for each remaining quarter-hour.
    pub fn run(&mut self, mut f: impl FnMut(usize, NaiveDateTime)) {
        while let Some((step, ts)) = self.tick() {
            f(step, ts);
        }
    }

    /// Start of the quarter-hour at `index`. Indices past the end keep counting.
    pub fn timestamp_at(&self, index: usize) -> NaiveDateTime {
        self.start + TimeDelta::minutes(index as i64 * 15)
    }

    /// Quarter-hour index of `ts`, if it falls inside this year.
    pub fn index_of(&self, ts: NaiveDateTime) -> Option<usize> {
        let minutes = (ts - self.start).num_minutes();
        if minutes < 0 || minutes % 15 != 0 {
            return None;
        }
        let index = usize::try_from(minutes / 15).ok()?;
        (index < self.total).then_some(index)
    }

    /// Every calendar day of the year in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.start
            .date()
            .iter_days()
            .take(self.total / QUARTERS_PER_DAY)
    }
}

pub(crate) fn first_day(year: i32) -> Result<NaiveDate, DisaggError> {
    NaiveDate::from_yo_opt(year, 1).ok_or(DisaggError::YearOutOfRange { year })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_lengths() {
        assert_eq!(quarters_in_year(2019), 35_040);
        assert_eq!(quarters_in_year(2020), 35_136);
        assert_eq!(quarters_in_year(2100), 35_040);
        assert_eq!(quarters_in_year(2000), 35_136);
    }

    #[test]
    fn test_tick() {
        let mut clock = YearClock::new(2020).expect("year in range");
        let (idx, ts) = clock.tick().expect("first quarter");
        assert_eq!(idx, 0);
        assert_eq!(ts.to_string(), "2020-01-01 00:00:00");
        let (idx, ts) = clock.tick().expect("second quarter");
        assert_eq!(idx, 1);
        assert_eq!(ts.to_string(), "2020-01-01 00:15:00");
    }

    #[test]
    fn test_run_exhausts_year() {
        let mut clock = YearClock::new(2020).expect("year in range");
        let mut last = None;
        clock.run(|idx, ts| last = Some((idx, ts)));
        let (idx, ts) = last.expect("clock ran");
        assert_eq!(idx, 35_135);
        assert_eq!(ts.to_string(), "2020-12-31 23:45:00");
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn test_index_round_trip() {
        let clock = YearClock::new(2020).expect("year in range");
        let ts = NaiveDate::from_ymd_opt(2020, 1, 3)
            .and_then(|d| d.and_hms_opt(14, 0, 0))
            .expect("valid timestamp");
        let idx = clock.index_of(ts).expect("inside year");
        assert_eq!(idx, 2 * 96 + 56);
        assert_eq!(clock.timestamp_at(idx), ts);
    }

    #[test]
    fn test_index_outside_year() {
        let clock = YearClock::new(2020).expect("year in range");
        let ts = NaiveDate::from_ymd_opt(2021, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        assert_eq!(clock.index_of(ts), None);
    }

    #[test]
    fn test_days() {
        let clock = YearClock::new(2021).expect("year in range");
        let days: Vec<NaiveDate> = clock.days().collect();
        assert_eq!(days.len(), 365);
        assert_eq!(days.last().map(|d| d.ordinal()), Some(365));
    }
}
