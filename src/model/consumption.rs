//! Annual consumption tables keyed by sector, region, year and carrier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::application::Application;
use super::region::{Region, State};
use super::sector::{EnergyCarrier, Sector, SectorKind};
use super::series::SeriesKey;

/// Identifies one annual consumption value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsumptionKey {
    pub sector: Sector,
    pub region: Region,
    pub year: i32,
    pub carrier: EnergyCarrier,
}

impl ConsumptionKey {
    pub fn new(sector: Sector, region: Region, year: i32, carrier: EnergyCarrier) -> Self {
        Self {
            sector,
            region,
            year,
            carrier,
        }
    }

    /// Same key moved to another year.
    pub fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }

    pub fn series_key(self, application: Option<Application>) -> SeriesKey {
        SeriesKey {
            sector: self.sector,
            region: self.region,
            carrier: self.carrier,
            year: self.year,
            application,
        }
    }

    fn in_state(&self, state: State) -> bool {
        self.region.state() == Some(state)
    }
}

/// Annual consumption in MWh per (sector, region, year, carrier).
///
/// Transformations never mutate a table in place; they build a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualConsumption {
    values: BTreeMap<ConsumptionKey, f64>,
}

impl AnnualConsumption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one for the same key.
    pub fn insert(&mut self, key: ConsumptionKey, value: f64) -> Option<f64> {
        self.values.insert(key, value)
    }

    pub fn get(&self, key: &ConsumptionKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConsumptionKey, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    /// Rows whose region belongs to `state`.
    pub fn for_state(&self, state: State) -> Self {
        self.filtered(|k| k.in_state(state))
    }

    /// Rows whose sector is of the given kind.
    pub fn for_kind(&self, kind: SectorKind) -> Self {
        self.filtered(|k| k.sector.kind() == kind)
    }

    /// Rows whose region does not resolve to any federal state.
    pub fn stateless_keys(&self) -> Vec<ConsumptionKey> {
        self.values
            .keys()
            .filter(|k| k.region.state().is_none())
            .copied()
            .collect()
    }

    fn filtered(&self, keep: impl Fn(&ConsumptionKey) -> bool) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }
}

impl FromIterator<(ConsumptionKey, f64)> for AnnualConsumption {
    fn from_iter<I: IntoIterator<Item = (ConsumptionKey, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Annual consumption split by application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionByApplication {
    values: BTreeMap<(ConsumptionKey, Application), f64>,
}

/// Application-resolved consumption after efficiency adjustment.
pub type AdjustedConsumption = ConsumptionByApplication;

impl ConsumptionByApplication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the entry, merging repeated inserts of the same key.
    pub fn add(&mut self, key: ConsumptionKey, application: Application, value: f64) {
        *self.values.entry((key, application)).or_insert(0.0) += value;
    }

    pub fn get(&self, key: &ConsumptionKey, application: Application) -> Option<f64> {
        self.values.get(&(*key, application)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConsumptionKey, Application, f64)> {
        self.values.iter().map(|((k, a), v)| (k, *a, *v))
    }

    /// Applications recorded for one consumption key.
    pub fn applications_of(&self, key: &ConsumptionKey) -> impl Iterator<Item = (Application, f64)> {
        self.values
            .range((*key, Application::ALL[0])..)
            .take_while(move |((k, _), _)| k == key)
            .map(|((_, a), v)| (*a, *v))
    }

    /// Distinct consumption keys in ascending order.
    pub fn keys(&self) -> Vec<ConsumptionKey> {
        let mut keys: Vec<ConsumptionKey> = self.values.keys().map(|(k, _)| *k).collect();
        keys.dedup();
        keys
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    /// Sum over applications for one consumption key.
    pub fn total_for(&self, key: &ConsumptionKey) -> f64 {
        self.applications_of(key).map(|(_, v)| v).sum()
    }

    pub fn for_state(&self, state: State) -> Self {
        self.filtered(|k| k.in_state(state))
    }

    pub fn for_kind(&self, kind: SectorKind) -> Self {
        self.filtered(|k| k.sector.kind() == kind)
    }

    fn filtered(&self, keep: impl Fn(&ConsumptionKey) -> bool) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|((k, _), _)| keep(k))
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }

    /// Collapses the application dimension back to annual totals.
    pub fn collapse(&self) -> AnnualConsumption {
        let mut out = AnnualConsumption::new();
        for ((key, _), value) in &self.values {
            *out.values.entry(*key).or_insert(0.0) += value;
        }
        out
    }

    pub(crate) fn extend_from(&mut self, other: Self) {
        for ((key, app), value) in other.values {
            self.add(key, app, value);
        }
    }
}

/// A table whose rows can each be spread over a year.
pub trait AnnualTable {
    /// One `(series key, annual value)` pair per row, in key order.
    fn series_inputs(&self) -> Vec<(SeriesKey, f64)>;
}

impl AnnualTable for AnnualConsumption {
    fn series_inputs(&self) -> Vec<(SeriesKey, f64)> {
        self.iter().map(|(k, v)| (k.series_key(None), v)).collect()
    }
}

impl AnnualTable for ConsumptionByApplication {
    fn series_inputs(&self) -> Vec<(SeriesKey, f64)> {
        self.iter()
            .map(|(k, app, v)| (k.series_key(Some(app)), v))
            .collect()
    }
}
