//! Successful output paired with the keys that failed.

use crate::error::DisaggError;
use crate::model::{Region, Sector};

/// A (sector, region) key that could not be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFailure {
    pub sector: Sector,
    pub region: Region,
    pub error: DisaggError,
}

impl KeyFailure {
    pub fn new(sector: Sector, region: Region, error: DisaggError) -> Self {
        Self {
            sector,
            region,
            error,
        }
    }
}

/// Result of a per-key stage.
///
/// A failing key never rolls back the others; its error is recorded in
/// `failures` and the rest of the output is still returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub output: T,
    pub failures: Vec<KeyFailure>,
}

impl<T> Outcome<T> {
    pub fn new(output: T, failures: Vec<KeyFailure>) -> Self {
        Self { output, failures }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Splits into output and failures.
    pub fn into_parts(self) -> (T, Vec<KeyFailure>) {
        (self.output, self.failures)
    }
}
