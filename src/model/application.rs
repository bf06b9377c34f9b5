//! End-use applications of final energy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Application {
    #[serde(rename = "lighting")]
    Lighting,
    #[serde(rename = "information_communication_technology")]
    InformationCommunicationTechnology,
    #[serde(rename = "space_cooling")]
    SpaceCooling,
    #[serde(rename = "process_cooling")]
    ProcessCooling,
    #[serde(rename = "mechanical_energy")]
    MechanicalEnergy,
    #[serde(rename = "space_heating")]
    SpaceHeating,
    #[serde(rename = "hot_water")]
    HotWater,
    /// Undivided process heat, split into temperature bands for industry.
    #[serde(rename = "process_heat")]
    ProcessHeat,
    #[serde(rename = "process_heat_below_100C")]
    ProcessHeatBelow100C,
    #[serde(rename = "process_heat_100_to_200C")]
    ProcessHeat100To200C,
    #[serde(rename = "process_heat_200_to_500C")]
    ProcessHeat200To500C,
    #[serde(rename = "process_heat_above_500C")]
    ProcessHeatAbove500C,
    #[serde(rename = "non_energetic_use")]
    NonEnergeticUse,
    /// Gas burnt in industrial self-generation plants.
    #[serde(rename = "industrial_power_plant")]
    IndustrialPowerPlant,
}

impl Application {
    pub const ALL: [Application; 14] = [
        Self::Lighting,
        Self::InformationCommunicationTechnology,
        Self::SpaceCooling,
        Self::ProcessCooling,
        Self::MechanicalEnergy,
        Self::SpaceHeating,
        Self::HotWater,
        Self::ProcessHeat,
        Self::ProcessHeatBelow100C,
        Self::ProcessHeat100To200C,
        Self::ProcessHeat200To500C,
        Self::ProcessHeatAbove500C,
        Self::NonEnergeticUse,
        Self::IndustrialPowerPlant,
    ];

    pub const PROCESS_HEAT_BANDS: [Application; 4] = [
        Self::ProcessHeatBelow100C,
        Self::ProcessHeat100To200C,
        Self::ProcessHeat200To500C,
        Self::ProcessHeatAbove500C,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lighting => "lighting",
            Self::InformationCommunicationTechnology => "information_communication_technology",
            Self::SpaceCooling => "space_cooling",
            Self::ProcessCooling => "process_cooling",
            Self::MechanicalEnergy => "mechanical_energy",
            Self::SpaceHeating => "space_heating",
            Self::HotWater => "hot_water",
            Self::ProcessHeat => "process_heat",
            Self::ProcessHeatBelow100C => "process_heat_below_100C",
            Self::ProcessHeat100To200C => "process_heat_100_to_200C",
            Self::ProcessHeat200To500C => "process_heat_200_to_500C",
            Self::ProcessHeatAbove500C => "process_heat_above_500C",
            Self::NonEnergeticUse => "non_energetic_use",
            Self::IndustrialPowerPlant => "industrial_power_plant",
        }
    }

    pub fn is_process_heat_band(self) -> bool {
        Self::PROCESS_HEAT_BANDS.contains(&self)
    }
}

impl FromStr for Application {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|app| app.as_str() == wanted)
            .ok_or_else(|| KeyParseError::new("application", s))
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
