//! Regional identifiers and the federal states they belong to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyParseError;

/// German federal state, ordered by its official state code (1–16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum State {
    SH,
    HH,
    NI,
    HB,
    NW,
    HE,
    RP,
    BW,
    BY,
    SL,
    BE,
    BB,
    MV,
    SN,
    ST,
    TH,
}

impl State {
    pub const ALL: [State; 16] = [
        Self::SH,
        Self::HH,
        Self::NI,
        Self::HB,
        Self::NW,
        Self::HE,
        Self::RP,
        Self::BW,
        Self::BY,
        Self::SL,
        Self::BE,
        Self::BB,
        Self::MV,
        Self::SN,
        Self::ST,
        Self::TH,
    ];

    /// Official state code, 1 for Schleswig-Holstein through 16 for Thüringen.
    pub fn code(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_code(code: u32) -> Option<Self> {
        let idx = usize::try_from(code).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::SH => "SH",
            Self::HH => "HH",
            Self::NI => "NI",
            Self::HB => "HB",
            Self::NW => "NW",
            Self::HE => "HE",
            Self::RP => "RP",
            Self::BW => "BW",
            Self::BY => "BY",
            Self::SL => "SL",
            Self::BE => "BE",
            Self::BB => "BB",
            Self::MV => "MV",
            Self::SN => "SN",
            Self::ST => "ST",
            Self::TH => "TH",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SH => "Schleswig-Holstein",
            Self::HH => "Hamburg",
            Self::NI => "Niedersachsen",
            Self::HB => "Bremen",
            Self::NW => "Nordrhein-Westfalen",
            Self::HE => "Hessen",
            Self::RP => "Rheinland-Pfalz",
            Self::BW => "Baden-Württemberg",
            Self::BY => "Bayern",
            Self::SL => "Saarland",
            Self::BE => "Berlin",
            Self::BB => "Brandenburg",
            Self::MV => "Mecklenburg-Vorpommern",
            Self::SN => "Sachsen",
            Self::ST => "Sachsen-Anhalt",
            Self::TH => "Thüringen",
        }
    }
}

impl FromStr for State {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Ok(code) = wanted.parse::<u32>() {
            return Self::from_code(code).ok_or_else(|| KeyParseError::new("state", s));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|st| st.abbreviation().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| KeyParseError::new("state", s))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Regional identifier, e.g. `06412` for Frankfurt am Main.
///
/// The state code is the identifier with its last three digits removed. A
/// region may carry a code whose state prefix is outside 1–16; resolving it is
/// deferred to [`Region::state`] so the offending key can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(u32);

impl Region {
    pub fn new(code: u32) -> Result<Self, KeyParseError> {
        if (1_000..=99_999).contains(&code) {
            Ok(Self(code))
        } else {
            Err(KeyParseError::new("region", code.to_string()))
        }
    }

    pub const fn code(self) -> u32 {
        self.0
    }

    pub const fn state_code(self) -> u32 {
        self.0 / 1_000
    }

    pub fn state(self) -> Option<State> {
        State::from_code(self.state_code())
    }
}

impl FromStr for Region {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .parse::<u32>()
            .map_err(|_| KeyParseError::new("region", s))?;
        Self::new(code)
    }
}

impl TryFrom<String> for Region {
    type Error = KeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.to_string()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hessen_region_resolves() {
        let region: Region = "06412".parse().expect("valid region");
        assert_eq!(region.state(), Some(State::HE));
        assert_eq!(region.to_string(), "06412");
    }

    #[test]
    fn leading_zero_is_optional() {
        assert_eq!("6412".parse::<Region>(), "06412".parse::<Region>());
    }

    #[test]
    fn out_of_range_state_prefix_does_not_resolve() {
        let region = Region::new(17_001).expect("syntactically valid");
        assert_eq!(region.state(), None);
    }

    #[test]
    fn state_codes_are_one_based() {
        assert_eq!(State::SH.code(), 1);
        assert_eq!(State::TH.code(), 16);
        assert_eq!(State::from_code(0), None);
        assert_eq!(State::from_code(6), Some(State::HE));
    }

    #[test]
    fn state_parses_from_abbreviation_or_code() {
        assert_eq!("he".parse::<State>(), Ok(State::HE));
        assert_eq!("9".parse::<State>(), Ok(State::BY));
        assert!("XX".parse::<State>().is_err());
    }
}
