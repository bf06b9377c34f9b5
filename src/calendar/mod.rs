//! Calendar primitives: the quarter-hour year clock and day labelling.

pub mod clock;
pub mod day_type;
pub mod holidays;

pub use clock::{QUARTERS_PER_DAY, YearClock, days_in_year, is_leap_year, quarters_in_year};
pub use day_type::{DayType, DayTypeSource, Season, WeekendsOnly};
pub use holidays::HolidayCalendar;
