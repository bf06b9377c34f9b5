//! Property-based tests for normalization and total preservation.

mod common;

use loadshape::calendar::{WeekendsOnly, quarters_in_year};
use loadshape::disagg::{ApplicationDisaggregator, DayWeighting, ShiftProfiles, relative_error};
use loadshape::factors::{EfficiencyCurve, ShiftDefinitions};
use loadshape::model::{EnergyCarrier, State};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Every shift column sums to one and covers the whole year.
    #[test]
    fn shift_columns_are_normalized(
        year in 1990i32..2060,
        state_idx in 0usize..16,
        residual in 0.05f64..=1.0,
    ) {
        let defs = ShiftDefinitions { residual_load: residual, ..ShiftDefinitions::default() };
        let p = ShiftProfiles::generate(State::ALL[state_idx], year, &defs, &WeekendsOnly)
            .expect("profiles build");
        prop_assert_eq!(p.len(), quarters_in_year(year));
        prop_assert!(p.validate(1e-9).is_ok());
    }
}

proptest! {
    /// Application parts sum back to the annual value.
    #[test]
    fn application_split_preserves_value(
        value in 0.0f64..1e9,
        sector_code in prop::sample::select(vec![5u8, 17, 33, 1, 47, 99]),
        gas in any::<bool>(),
    ) {
        let store = common::store();
        let carrier = if gas { EnergyCarrier::Gas } else { EnergyCarrier::Power };
        let key = common::key(sector_code, 6412, 2020, carrier);
        let parts = ApplicationDisaggregator::from_store(&store)
            .split(&key, value)
            .expect("shares exist");
        let sum: f64 = parts.iter().map(|(_, v)| v).sum();
        prop_assert!(relative_error(value, sum) < 1e-9);
        prop_assert!(parts.iter().all(|(_, v)| *v >= 0.0));
    }

    /// Positive rates never increase consumption.
    #[test]
    fn efficiency_factor_is_monotone(
        r1 in 0.0f64..0.05,
        r2 in 0.0f64..0.05,
        year in 2019i32..2080,
    ) {
        let curve = EfficiencyCurve::two_phase(2019, (2035, r1), (2050, r2)).expect("valid curve");
        prop_assert!(curve.factor(year + 1) <= curve.factor(year));
        prop_assert!(curve.factor(year) <= 1.0);
        prop_assert!(curve.factor(year) > 0.0);
    }

    /// Per-day weights are normalized regardless of scale.
    #[test]
    fn day_weighting_is_normalized(
        weights in prop::collection::vec(0.0f64..100.0, 365),
        bump in 0usize..365,
    ) {
        let mut weights = weights;
        weights[bump] += 1.0;
        let shares = DayWeighting::PerDay(weights).shares(2021).expect("valid weighting");
        let sum: f64 = shares.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }
}
