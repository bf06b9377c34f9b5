//! Reader for public-holiday lists.
//!
//! Layout: `state,date` with ISO dates. `DE` marks a nationwide holiday;
//! any other value is a state abbreviation or code.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{read_rows, read_rows_from_path};
use crate::calendar::HolidayCalendar;
use crate::error::LoadError;
use crate::model::State;

const NATIONWIDE: &str = "DE";

#[derive(Debug, Deserialize)]
struct HolidayRow {
    state: String,
    date: NaiveDate,
}

pub fn read_holidays(reader: impl Read, origin: &str) -> Result<HolidayCalendar, LoadError> {
    build(read_rows(reader, origin)?, origin)
}

pub fn read_holidays_file(path: &Path) -> Result<HolidayCalendar, LoadError> {
    build(read_rows_from_path(path)?, &path.display().to_string())
}

fn build(rows: Vec<HolidayRow>, origin: &str) -> Result<HolidayCalendar, LoadError> {
    let mut calendar = HolidayCalendar::new();
    for (i, row) in rows.into_iter().enumerate() {
        if row.state.eq_ignore_ascii_case(NATIONWIDE) {
            calendar.add_nationwide(row.date);
        } else {
            let state: State = row
                .state
                .parse()
                .map_err(|e| LoadError::row(origin, i as u64 + 2, format!("{e}")))?;
            calendar.add_regional(state, row.date);
        }
    }
    Ok(calendar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DayType, DayTypeSource};

    #[test]
    fn nationwide_and_regional_rows() {
        let csv = "state,date\nDE,2020-01-01\nHE,2020-06-11\n";
        let cal = read_holidays(csv.as_bytes(), "inline").expect("valid holidays");
        let d = NaiveDate::from_ymd_opt(2020, 6, 11).expect("valid date");
        assert_eq!(cal.day_type(State::HE, d), DayType::Sunday);
        assert_eq!(cal.day_type(State::HH, d), DayType::Workday);
        assert_eq!(cal.len(), 2);
    }

    #[test]
    fn rejects_unknown_state() {
        let csv = "state,date\nXX,2020-01-01\n";
        assert!(read_holidays(csv.as_bytes(), "inline").is_err());
    }
}
