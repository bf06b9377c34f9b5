//! Spread CTS consumption with standard load profiles.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::debug;

use super::outcome::{KeyFailure, Outcome};
use crate::calendar::{DayTypeSource, Season, YearClock, days_in_year};
use crate::error::DisaggError;
use crate::factors::{FactorStore, LoadProfile, SectorSlpMap, SlpTable};
use crate::model::{AnnualTable, SeriesKey, State, TimeSeries};

/// How the annual total is distributed over the days of the year.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DayWeighting {
    /// Every day receives `1 / days_in_year`.
    #[default]
    Uniform,
    /// Externally supplied relative weights, one per day, normalized to 1.
    PerDay(Vec<f64>),
}

impl DayWeighting {
    /// Day shares for `year`, summing to 1.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` if a per-day weighting has the wrong
    /// length, a negative weight, or no weight at all.
    pub fn shares(&self, year: i32) -> Result<Vec<f64>, DisaggError> {
        let days = days_in_year(year);
        match self {
            Self::Uniform => Ok(vec![1.0 / days as f64; days]),
            Self::PerDay(weights) => {
                if weights.len() != days {
                    return Err(DisaggError::malformed(
                        "day_weighting",
                        format!("{} weights for {days} days in {year}", weights.len()),
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(DisaggError::malformed(
                        "day_weighting",
                        "weights must be finite and non-negative",
                    ));
                }
                let sum: f64 = weights.iter().sum();
                if sum <= 0.0 {
                    return Err(DisaggError::malformed("day_weighting", "weights sum to zero"));
                }
                Ok(weights.iter().map(|w| w / sum).collect())
            }
        }
    }
}

/// Builds yearly SLP vectors and multiplies CTS rows by them.
#[derive(Clone, Copy)]
pub struct CtsDisaggregator<'a> {
    slp: &'a SlpTable,
    sector_slp: &'a SectorSlpMap,
    days: &'a dyn DayTypeSource,
    weighting: &'a DayWeighting,
}

static UNIFORM: DayWeighting = DayWeighting::Uniform;

impl<'a> CtsDisaggregator<'a> {
    pub fn new(
        slp: &'a SlpTable,
        sector_slp: &'a SectorSlpMap,
        days: &'a dyn DayTypeSource,
    ) -> Self {
        Self {
            slp,
            sector_slp,
            days,
            weighting: &UNIFORM,
        }
    }

    pub fn from_store(store: &'a FactorStore, days: &'a dyn DayTypeSource) -> Self {
        Self::new(store.slp(), store.sector_slp(), days)
    }

    pub fn with_weighting(mut self, weighting: &'a DayWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Quarter-hour shape of `profile` over `year` in `state`, summing to 1.
    ///
    /// Each day contributes its (season, day type) column scaled by the day's
    /// share of the year.
    pub fn profile(
        &self,
        profile: LoadProfile,
        state: State,
        year: i32,
    ) -> Result<Vec<f64>, DisaggError> {
        let shape = self
            .slp
            .get(profile)
            .ok_or_else(|| DisaggError::malformed("slp_profiles", format!("{profile} is not defined")))?;
        let clock = YearClock::new(year)?;
        let day_shares = self.weighting.shares(year)?;

        let mut values = Vec::with_capacity(clock.len());
        for (date, share) in clock.days().zip(day_shares) {
            let column = shape.column(Season::of(date), self.days.day_type(state, date));
            values.extend(column.iter().map(|w| w * share));
        }
        Ok(values)
    }

    /// Spreads every row of `consumption`.
    ///
    /// # Errors (per key)
    ///
    /// * `UnknownState` - region does not resolve to a state
    /// * `UnknownSlp` - no profile for the sector in that state, or the
    ///   profile has no shape
    pub fn run(&self, consumption: &impl AnnualTable) -> Outcome<Vec<TimeSeries>> {
        let inputs = consumption.series_inputs();

        // Resolve profiles first so each (profile, state, year) is built once.
        let resolved: Vec<Result<(State, LoadProfile), DisaggError>> = inputs
            .iter()
            .map(|(key, _)| self.resolve(key))
            .collect();
        let needed: BTreeSet<(LoadProfile, State, i32)> = inputs
            .iter()
            .zip(&resolved)
            .filter_map(|((key, _), r)| r.as_ref().ok().map(|(s, p)| (*p, *s, key.year)))
            .collect();
        let shapes: BTreeMap<(LoadProfile, State, i32), Result<Vec<f64>, DisaggError>> = needed
            .into_par_iter()
            .map(|(p, s, y)| ((p, s, y), self.profile(p, s, y)))
            .collect();

        let results: Vec<Result<TimeSeries, KeyFailure>> = inputs
            .par_iter()
            .zip(resolved.into_par_iter())
            .map(|((key, value), r)| {
                let fail = |error| KeyFailure::new(key.sector, key.region, error);
                let (state, profile) = r.map_err(fail)?;
                match shapes.get(&(profile, state, key.year)) {
                    Some(Ok(weights)) => Ok(TimeSeries {
                        key: *key,
                        values: weights.iter().map(|w| value * w).collect(),
                    }),
                    Some(Err(error)) => Err(fail(error.clone())),
                    None => Err(fail(DisaggError::UnknownSlp {
                        sector: key.sector,
                        state,
                    })),
                }
            })
            .collect();

        let mut output = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for r in results {
            match r {
                Ok(series) => output.push(series),
                Err(failure) => failures.push(failure),
            }
        }
        debug!(
            series = output.len(),
            failed = failures.len(),
            "CTS disaggregation done"
        );
        Outcome::new(output, failures)
    }

    fn resolve(&self, key: &SeriesKey) -> Result<(State, LoadProfile), DisaggError> {
        let state = key
            .region
            .state()
            .ok_or(DisaggError::UnknownState { region: key.region })?;
        let unknown = DisaggError::UnknownSlp {
            sector: key.sector,
            state,
        };
        let profile = self.sector_slp.resolve(state, key.sector).ok_or(unknown.clone())?;
        if self.slp.get(profile).is_none() {
            return Err(unknown);
        }
        Ok((state, profile))
    }
}

/// Spreads CTS rows with uniform day weighting.
pub fn temporal_cts(
    consumption: &impl AnnualTable,
    slp: &SlpTable,
    sector_slp: &SectorSlpMap,
    days: &dyn DayTypeSource,
) -> Outcome<Vec<TimeSeries>> {
    CtsDisaggregator::new(slp, sector_slp, days).run(consumption)
}
