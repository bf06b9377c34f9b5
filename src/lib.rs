//! Temporal disaggregation of annual industry and CTS energy consumption.
//!
//! Annual values per (sector, region, carrier) are split by application,
//! adjusted for efficiency gains and spread over the quarter-hours of a
//! year, using shift profiles for industry and standard load profiles for
//! commerce, trade and services. Every stage preserves totals within a
//! configurable tolerance.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod disagg;
pub mod error;
pub mod factors;
pub mod io;
pub mod model;
pub mod reporting;
pub mod runner;
pub mod telemetry;

pub use error::{DisaggError, LoadError, Result};
