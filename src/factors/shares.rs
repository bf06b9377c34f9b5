//! Application share vectors and the temperature-band split of process heat.

use std::collections::BTreeMap;

use crate::error::DisaggError;
use crate::model::{Application, EnergyCarrier, Region, Sector, SectorKind};

/// Fraction of a sector's consumption per application.
pub type ShareVector = BTreeMap<Application, f64>;

/// Application shares per (sector, carrier).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareTable {
    entries: BTreeMap<(Sector, EnergyCarrier), ShareVector>,
}

impl ShareTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one share, returning the previous value for the same application.
    pub fn insert(
        &mut self,
        sector: Sector,
        carrier: EnergyCarrier,
        application: Application,
        share: f64,
    ) -> Option<f64> {
        self.entries
            .entry((sector, carrier))
            .or_default()
            .insert(application, share)
    }

    pub fn get(&self, sector: Sector, carrier: EnergyCarrier) -> Option<&ShareVector> {
        self.entries.get(&(sector, carrier))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Sector, EnergyCarrier), &ShareVector)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every vector is non-negative and sums to 1 within `tolerance`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` naming the first offending sector.
    pub fn validate(&self, tolerance: f64) -> Result<(), DisaggError> {
        for ((sector, carrier), vector) in &self.entries {
            check_vector(vector, tolerance).map_err(|reason| {
                DisaggError::malformed(
                    "application_shares",
                    format!("sector {sector} ({carrier}): {reason}"),
                )
            })?;
        }
        Ok(())
    }

    /// Replaces industry `process_heat` shares with their temperature bands.
    ///
    /// For an industry vector with process-heat share `p` and band shares `b_i`,
    /// each band gets `p * b_i`. The other applications are kept as they are.
    /// Industry sectors without band data keep undivided process heat; CTS
    /// vectors are never touched.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` if a base vector already carries a band key.
    pub fn blend_process_heat(mut self, bands: &ProcessHeatBands) -> Result<Self, DisaggError> {
        for ((sector, carrier), vector) in self.entries.iter_mut() {
            if sector.kind() != SectorKind::Industry {
                continue;
            }
            let Some(split) = bands.get(*sector) else {
                continue;
            };
            let Some(p) = vector.remove(&Application::ProcessHeat) else {
                continue;
            };
            for (&band, &b) in split {
                if vector.insert(band, p * b).is_some() {
                    return Err(DisaggError::malformed(
                        "application_shares",
                        format!(
                            "sector {sector} ({carrier}) lists `{band}` next to process_heat"
                        ),
                    ));
                }
            }
        }
        Ok(self)
    }
}

/// Temperature-band composition of industrial process heat per sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessHeatBands {
    entries: BTreeMap<Sector, ShareVector>,
}

impl ProcessHeatBands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sector: Sector, band: Application, share: f64) -> Option<f64> {
        self.entries.entry(sector).or_default().insert(band, share)
    }

    pub fn get(&self, sector: Sector) -> Option<&ShareVector> {
        self.entries.get(&sector)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bands must belong to industry sectors, use only band keys and sum to 1.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFactorTable` on the first violation.
    pub fn validate(&self, tolerance: f64) -> Result<(), DisaggError> {
        for (sector, vector) in &self.entries {
            if sector.kind() != SectorKind::Industry {
                return Err(DisaggError::malformed(
                    "process_heat_bands",
                    format!("sector {sector} is not an industry sector"),
                ));
            }
            if let Some(app) = vector.keys().find(|a| !a.is_process_heat_band()) {
                return Err(DisaggError::malformed(
                    "process_heat_bands",
                    format!("sector {sector}: `{app}` is not a temperature band"),
                ));
            }
            check_vector(vector, tolerance).map_err(|reason| {
                DisaggError::malformed("process_heat_bands", format!("sector {sector}: {reason}"))
            })?;
        }
        Ok(())
    }
}

/// Share of gas consumption burnt in industrial self-generation, per region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelfGeneration {
    shares: BTreeMap<Region, f64>,
}

impl SelfGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region: Region, share: f64) -> Option<f64> {
        self.shares.insert(region, share)
    }

    /// Fraction for `region`, zero when the region is not listed.
    pub fn share(&self, region: Region) -> f64 {
        self.shares.get(&region).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn validate(&self) -> Result<(), DisaggError> {
        match self
            .shares
            .iter()
            .find(|(_, s)| !(0.0..=1.0).contains(*s))
        {
            Some((region, share)) => Err(DisaggError::malformed(
                "self_generation",
                format!("region {region}: share {share} outside [0, 1]"),
            )),
            None => Ok(()),
        }
    }
}

fn check_vector(vector: &ShareVector, tolerance: f64) -> Result<(), String> {
    if vector.is_empty() {
        return Err("empty share vector".into());
    }
    if let Some((app, share)) = vector.iter().find(|(_, s)| !s.is_finite() || **s < 0.0) {
        return Err(format!("share of `{app}` is {share}"));
    }
    let sum: f64 = vector.values().sum();
    if (sum - 1.0).abs() > tolerance {
        return Err(format!("shares sum to {sum:.9}, expected 1"));
    }
    Ok(())
}
