//! The disaggregation stages: application split, efficiency adjustment,
//! shift-profile generation and the industry / CTS temporal spreaders.

pub mod application;
pub mod balance;
pub mod cts;
pub mod efficiency;
pub mod industry;
pub mod outcome;
pub mod shift_profile;

pub use application::{ApplicationDisaggregator, disaggregate_by_application};
pub use balance::{BalanceReport, relative_error};
pub use cts::{CtsDisaggregator, DayWeighting, temporal_cts};
pub use efficiency::apply_efficiency;
pub use industry::temporal_industry;
pub use outcome::{KeyFailure, Outcome};
pub use shift_profile::{ShiftProfileSet, ShiftProfiles};
