//! Economic-activity sectors (WZ codes) and energy carriers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyParseError;

/// Inclusive ranges of valid WZ codes. Codes 4, 34, 40, 44, 48, 54, 57, 67, 76,
/// 83 and 89 do not exist.
const SECTOR_RANGES: [(u8, u8); 12] = [
    (1, 3),
    (5, 33),
    (35, 39),
    (41, 43),
    (45, 47),
    (49, 53),
    (55, 56),
    (58, 66),
    (68, 75),
    (77, 82),
    (84, 88),
    (90, 99),
];

/// Industry covers WZ 5 through 33; every other valid code is CTS.
const INDUSTRY_RANGE: (u8, u8) = (5, 33);

/// One of the 88 enumerated sector codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sector(u8);

impl Sector {
    /// Validates `code` against the closed sector enumeration.
    pub fn new(code: u8) -> Result<Self, KeyParseError> {
        if SECTOR_RANGES
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&code))
        {
            Ok(Self(code))
        } else {
            Err(KeyParseError::new("sector", code.to_string()))
        }
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub fn kind(self) -> SectorKind {
        if (INDUSTRY_RANGE.0..=INDUSTRY_RANGE.1).contains(&self.0) {
            SectorKind::Industry
        } else {
            SectorKind::Cts
        }
    }

    /// All 88 sectors in ascending order.
    pub fn all() -> impl Iterator<Item = Sector> {
        SECTOR_RANGES
            .iter()
            .flat_map(|&(lo, hi)| lo..=hi)
            .map(Sector)
    }

    /// All sectors of the given kind in ascending order.
    pub fn of_kind(kind: SectorKind) -> impl Iterator<Item = Sector> {
        Self::all().filter(move |s| s.kind() == kind)
    }
}

impl TryFrom<u8> for Sector {
    type Error = KeyParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<Sector> for u8 {
    fn from(sector: Sector) -> Self {
        sector.0
    }
}

impl FromStr for Sector {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .parse::<u8>()
            .map_err(|_| KeyParseError::new("sector", s))?;
        Self::new(code)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse sector grouping that decides which temporal shape applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorKind {
    Industry,
    Cts,
}

impl SectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Industry => "industry",
            Self::Cts => "cts",
        }
    }
}

impl FromStr for SectorKind {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "industry" => Ok(Self::Industry),
            "cts" => Ok(Self::Cts),
            _ => Err(KeyParseError::new("sector kind", s)),
        }
    }
}

impl fmt::Display for SectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final energy carrier of an annual consumption value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyCarrier {
    Power,
    Gas,
    Petrol,
}

impl EnergyCarrier {
    pub const ALL: [EnergyCarrier; 3] = [Self::Power, Self::Gas, Self::Petrol];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Gas => "gas",
            Self::Petrol => "petrol",
        }
    }
}

impl FromStr for EnergyCarrier {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "power" => Ok(Self::Power),
            "gas" => Ok(Self::Gas),
            "petrol" => Ok(Self::Petrol),
            _ => Err(KeyParseError::new("energy carrier", s)),
        }
    }
}

impl fmt::Display for EnergyCarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
