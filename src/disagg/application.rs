//! Split annual consumption into per-application consumption.

use tracing::debug;

use super::outcome::{KeyFailure, Outcome};
use crate::error::DisaggError;
use crate::factors::{FactorStore, SelfGeneration, ShareTable};
use crate::model::{
    AnnualConsumption, Application, ConsumptionByApplication, ConsumptionKey, EnergyCarrier,
    SectorKind,
};

/// Multiplies annual values by their sector's application shares.
///
/// For gas in industry, a regional self-generation fraction is first moved
/// into [`Application::IndustrialPowerPlant`] and only the remainder is
/// decomposed.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationDisaggregator<'a> {
    shares: &'a ShareTable,
    self_generation: Option<&'a SelfGeneration>,
}

impl<'a> ApplicationDisaggregator<'a> {
    pub fn new(shares: &'a ShareTable) -> Self {
        Self {
            shares,
            self_generation: None,
        }
    }

    pub fn with_self_generation(mut self, self_generation: &'a SelfGeneration) -> Self {
        self.self_generation = Some(self_generation);
        self
    }

    /// Blended shares plus the self-generation split from `store`.
    pub fn from_store(store: &'a FactorStore) -> Self {
        Self::new(store.shares()).with_self_generation(store.self_generation())
    }

    /// Per-application values for one key; they sum to `value`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSector` if the sector has no share vector for the carrier.
    pub fn split(
        &self,
        key: &ConsumptionKey,
        value: f64,
    ) -> Result<Vec<(Application, f64)>, DisaggError> {
        let shares = self
            .shares
            .get(key.sector, key.carrier)
            .ok_or(DisaggError::UnknownSector {
                sector: key.sector,
                carrier: key.carrier,
            })?;

        let own_generation = match self.self_generation {
            Some(table)
                if key.carrier == EnergyCarrier::Gas
                    && key.sector.kind() == SectorKind::Industry =>
            {
                value * table.share(key.region)
            }
            _ => 0.0,
        };
        let remainder = value - own_generation;

        let mut parts: Vec<(Application, f64)> = shares
            .iter()
            .map(|(app, share)| (*app, remainder * share))
            .collect();
        if own_generation > 0.0 {
            parts.push((Application::IndustrialPowerPlant, own_generation));
        }
        Ok(parts)
    }

    pub fn run(&self, consumption: &AnnualConsumption) -> Outcome<ConsumptionByApplication> {
        let mut output = ConsumptionByApplication::new();
        let mut failures = Vec::new();
        for (key, value) in consumption.iter() {
            match self.split(key, value) {
                Ok(parts) => {
                    for (app, v) in parts {
                        output.add(*key, app, v);
                    }
                }
                Err(error) => failures.push(KeyFailure::new(key.sector, key.region, error)),
            }
        }
        debug!(
            keys = consumption.len(),
            rows = output.len(),
            failed = failures.len(),
            "application split done"
        );
        Outcome::new(output, failures)
    }
}

/// Splits every row of `consumption` by the share vector of its sector.
pub fn disaggregate_by_application(
    consumption: &AnnualConsumption,
    shares: &ShareTable,
) -> Outcome<ConsumptionByApplication> {
    ApplicationDisaggregator::new(shares).run(consumption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Region, Sector};

    fn key(sector: u8, carrier: EnergyCarrier) -> ConsumptionKey {
        ConsumptionKey::new(
            Sector::new(sector).expect("valid sector"),
            Region::new(6412).expect("valid region"),
            2019,
            carrier,
        )
    }

    fn shares() -> ShareTable {
        let mut t = ShareTable::new();
        let s47 = Sector::new(47).expect("valid sector");
        t.insert(s47, EnergyCarrier::Power, Application::Lighting, 0.4);
        t.insert(s47, EnergyCarrier::Power, Application::SpaceCooling, 0.6);
        let s20 = Sector::new(20).expect("valid sector");
        t.insert(s20, EnergyCarrier::Gas, Application::ProcessHeatAbove500C, 0.7);
        t.insert(s20, EnergyCarrier::Gas, Application::SpaceHeating, 0.3);
        t
    }

    #[test]
    fn split_preserves_total() {
        let table: AnnualConsumption = [(key(47, EnergyCarrier::Power), 250.0)]
            .into_iter()
            .collect();
        let out = disaggregate_by_application(&table, &shares());
        assert!(out.is_clean());
        assert!((out.output.total() - 250.0).abs() < 1e-9);
        assert_eq!(
            out.output
                .get(&key(47, EnergyCarrier::Power), Application::Lighting),
            Some(100.0)
        );
    }

    #[test]
    fn unknown_sector_is_reported_not_zeroed() {
        let table: AnnualConsumption = [
            (key(47, EnergyCarrier::Power), 10.0),
            (key(47, EnergyCarrier::Gas), 10.0),
        ]
        .into_iter()
        .collect();
        let out = disaggregate_by_application(&table, &shares());
        assert_eq!(out.failures.len(), 1);
        assert!(matches!(
            out.failures[0].error,
            DisaggError::UnknownSector {
                carrier: EnergyCarrier::Gas,
                ..
            }
        ));
        assert_eq!(out.output.keys().len(), 1);
    }

    #[test]
    fn self_generation_splits_industrial_gas() {
        let mut own = SelfGeneration::new();
        own.insert(Region::new(6412).expect("valid region"), 0.2);
        let shares = shares();
        let disagg = ApplicationDisaggregator::new(&shares).with_self_generation(&own);

        let parts = disagg
            .split(&key(20, EnergyCarrier::Gas), 100.0)
            .expect("shares exist");
        let plant = parts
            .iter()
            .find(|(a, _)| *a == Application::IndustrialPowerPlant)
            .map(|(_, v)| *v);
        assert_eq!(plant, Some(20.0));
        let total: f64 = parts.iter().map(|(_, v)| v).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn self_generation_ignores_power() {
        let mut own = SelfGeneration::new();
        own.insert(Region::new(6412).expect("valid region"), 0.2);
        let shares = shares();
        let disagg = ApplicationDisaggregator::new(&shares).with_self_generation(&own);
        let parts = disagg
            .split(&key(47, EnergyCarrier::Power), 100.0)
            .expect("shares exist");
        assert!(parts.iter().all(|(a, _)| *a != Application::IndustrialPowerPlant));
    }
}
