//! Shared test fixtures for integration tests.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use loadshape::calendar::{DayType, HolidayCalendar, QUARTERS_PER_DAY, Season};
use loadshape::factors::{
    EfficiencyTable, FactorStore, FactorTables, LoadProfile, ProcessHeatBands, RateRow, RateScope,
    SelfGeneration, ShareTable, SlpShape, SlpTable, Tolerance,
};
use loadshape::model::{
    AnnualConsumption, Application, ConsumptionKey, EnergyCarrier, Region, Sector, SectorKind,
    State,
};

/// Base year of every fixture efficiency curve.
pub const BASE_YEAR: i32 = 2019;

pub fn sector(code: u8) -> Sector {
    Sector::new(code).expect("valid sector")
}

pub fn region(code: u32) -> Region {
    Region::new(code).expect("valid region")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn key(sector_code: u8, region_code: u32, year: i32, carrier: EnergyCarrier) -> ConsumptionKey {
    ConsumptionKey::new(sector(sector_code), region(region_code), year, carrier)
}

/// Industry share vector, with undivided process heat.
pub const INDUSTRY_SHARES: [(Application, f64); 3] = [
    (Application::MechanicalEnergy, 0.4),
    (Application::ProcessHeat, 0.4),
    (Application::Lighting, 0.2),
];

pub const CTS_SHARES: [(Application, f64); 3] = [
    (Application::Lighting, 0.3),
    (Application::SpaceHeating, 0.5),
    (Application::HotWater, 0.2),
];

pub const BANDS: [(Application, f64); 4] = [
    (Application::ProcessHeatBelow100C, 0.5),
    (Application::ProcessHeat100To200C, 0.3),
    (Application::ProcessHeat200To500C, 0.1),
    (Application::ProcessHeatAbove500C, 0.1),
];

/// Distinct, normalized daily shape for one SLP column.
pub fn slp_day(column: usize) -> [f64; QUARTERS_PER_DAY] {
    let raw: [f64; QUARTERS_PER_DAY] = std::array::from_fn(|q| (1 + (q + column) % 7) as f64);
    let sum: f64 = raw.iter().sum();
    raw.map(|w| w / sum)
}

pub fn slp_shape() -> SlpShape {
    let mut columns = [[0.0; QUARTERS_PER_DAY]; 9];
    for (i, col) in columns.iter_mut().enumerate() {
        *col = slp_day(i);
    }
    SlpShape::new(columns)
}

pub fn slp_table() -> SlpTable {
    let mut table = SlpTable::new();
    for profile in LoadProfile::ALL {
        table.insert(profile, slp_shape());
    }
    table
}

pub fn rate_rows() -> Vec<RateRow> {
    let mut rows = Vec::new();
    for carrier in EnergyCarrier::ALL {
        for (until_year, rate) in [(2035, 0.01), (2045, 0.02)] {
            rows.push(RateRow {
                scope: RateScope::Kind(SectorKind::Industry),
                carrier,
                application: None,
                until_year,
                rate,
            });
        }
        rows.push(RateRow {
            scope: RateScope::Kind(SectorKind::Cts),
            carrier,
            application: None,
            until_year: 2050,
            rate: 0.015,
        });
    }
    rows
}

/// Complete tables: shares for every sector and carrier, bands, curves,
/// self-generation for one Hessian district and all eleven load profiles.
pub fn factor_tables() -> FactorTables {
    let mut shares = ShareTable::new();
    let mut bands = ProcessHeatBands::new();
    for s in Sector::all() {
        let vector = match s.kind() {
            SectorKind::Industry => &INDUSTRY_SHARES,
            SectorKind::Cts => &CTS_SHARES,
        };
        for carrier in EnergyCarrier::ALL {
            for (app, share) in vector {
                shares.insert(s, carrier, *app, *share);
            }
        }
        if s.kind() == SectorKind::Industry {
            for (band, share) in BANDS {
                bands.insert(s, band, share);
            }
        }
    }
    let mut self_generation = SelfGeneration::new();
    self_generation.insert(region(6412), 0.1);

    FactorTables {
        shares,
        process_heat_bands: bands,
        efficiency: EfficiencyTable::from_rows(BASE_YEAR, &rate_rows()).expect("valid rates"),
        self_generation,
        slp: slp_table(),
        ..FactorTables::default()
    }
}

pub fn store() -> FactorStore {
    FactorStore::load(factor_tables(), Tolerance::default()).expect("valid tables")
}

/// Public holidays of Hessen in 2020.
pub fn hessen_2020_holidays() -> HolidayCalendar {
    let mut cal = HolidayCalendar::new();
    for (m, d) in [(1, 1), (4, 10), (4, 13), (5, 1), (5, 21), (6, 1), (10, 3), (12, 25), (12, 26)] {
        cal.add_nationwide(date(2020, m, d));
    }
    cal.add_regional(State::HE, date(2020, 6, 11));
    cal
}

/// Random consumption over every sector, state and carrier.
pub fn random_consumption(seed: u64, rows: usize, year: i32) -> AnnualConsumption {
    let mut rng = StdRng::seed_from_u64(seed);
    let sectors: Vec<Sector> = Sector::all().collect();
    (0..rows)
        .map(|_| {
            let s = sectors[rng.random_range(0..sectors.len())];
            let state = State::ALL[rng.random_range(0..State::ALL.len())];
            let r = region(state.code() * 1000 + rng.random_range(1..100));
            let carrier = EnergyCarrier::ALL[rng.random_range(0..EnergyCarrier::ALL.len())];
            let value = rng.random_range(1.0..10_000.0);
            (ConsumptionKey::new(s, r, year, carrier), value)
        })
        .collect()
}

/// Writes the fixture tables as a factor directory.
pub fn write_factor_dir(dir: &Path) {
    let mut shares = String::from("sector,carrier,application,share\n");
    let mut bands = String::from("sector,application,share\n");
    for s in Sector::all() {
        let vector = match s.kind() {
            SectorKind::Industry => &INDUSTRY_SHARES,
            SectorKind::Cts => &CTS_SHARES,
        };
        for carrier in EnergyCarrier::ALL {
            for (app, share) in vector {
                let _ = writeln!(shares, "{s},{carrier},{app},{share}");
            }
        }
        if s.kind() == SectorKind::Industry {
            for (band, share) in BANDS {
                let _ = writeln!(bands, "{s},{band},{share}");
            }
        }
    }
    fs::write(dir.join("application_shares.csv"), shares).expect("write shares");
    fs::write(dir.join("process_heat_bands.csv"), bands).expect("write bands");

    let mut rates = String::from("sectors,carrier,application,until_year,rate\n");
    for row in rate_rows() {
        let scope = match row.scope {
            RateScope::Kind(kind) => kind.to_string(),
            RateScope::Sector(s) => s.to_string(),
        };
        let _ = writeln!(rates, "{scope},{},,{},{}", row.carrier, row.until_year, row.rate);
    }
    fs::write(dir.join("efficiency_rates.csv"), rates).expect("write rates");

    let mut header = String::from("profile,quarter");
    for season in Season::ALL {
        for day in DayType::ALL {
            let _ = write!(header, ",{season}_{day}");
        }
    }
    let mut slp = header + "\n";
    let shape: Vec<[f64; QUARTERS_PER_DAY]> = (0..9).map(slp_day).collect();
    for profile in LoadProfile::ALL {
        for q in 0..QUARTERS_PER_DAY {
            let _ = write!(slp, "{profile},{q}");
            for col in &shape {
                let _ = write!(slp, ",{}", col[q]);
            }
            slp.push('\n');
        }
    }
    fs::write(dir.join("slp_profiles.csv"), slp).expect("write slp");

    fs::write(dir.join("self_generation.csv"), "region,share\n06412,0.1\n")
        .expect("write self generation");
}

/// Writes the Hessen 2020 holidays as a holiday sheet.
pub fn write_holidays(path: &Path) {
    let mut body = String::from("state,date\n");
    for (m, d) in [(1, 1), (4, 10), (4, 13), (5, 1), (5, 21), (6, 1), (10, 3), (12, 25), (12, 26)] {
        let _ = writeln!(body, "DE,{}", date(2020, m, d));
    }
    body.push_str("HE,2020-06-11\n");
    fs::write(path, body).expect("write holidays");
}
