//! Post-hoc total-preservation check of generated series.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::DisaggError;
use crate::model::{SeriesKey, TimeSeries};

/// Compares every series total with the annual value it was built from.
///
/// Deviations beyond the tolerance are reported as `ToleranceViolation`
/// and never corrected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceReport {
    /// Number of series compared.
    pub series_checked: usize,
    /// Sum of the expected annual values.
    pub input_total: f64,
    /// Sum over all quarter-hour values.
    pub output_total: f64,
    /// Largest per-series relative error.
    pub max_relative_error: f64,
    /// Series whose relative error exceeds the tolerance.
    pub violations: Vec<DisaggError>,
}

impl BalanceReport {
    /// Checks each series against `expected`.
    ///
    /// # Arguments
    ///
    /// * `expected` - Annual value per series key
    /// * `series` - Generated series; keys missing from `expected` count as zero
    /// * `tolerance` - Maximum relative error per series
    pub fn from_series(
        expected: &BTreeMap<SeriesKey, f64>,
        series: &[TimeSeries],
        tolerance: f64,
    ) -> Self {
        let mut report = Self::default();
        for s in series {
            let want = expected.get(&s.key).copied().unwrap_or(0.0);
            let got = s.total();
            let err = relative_error(want, got);
            report.series_checked += 1;
            report.input_total += want;
            report.output_total += got;
            report.max_relative_error = report.max_relative_error.max(err);
            if err > tolerance {
                report.violations.push(DisaggError::ToleranceViolation {
                    key: s.key.to_string(),
                    expected: want,
                    actual: got,
                    relative_error: err,
                });
            }
        }
        report
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.series_checked += other.series_checked;
        self.input_total += other.input_total;
        self.output_total += other.output_total;
        self.max_relative_error = self.max_relative_error.max(other.max_relative_error);
        self.violations.extend(other.violations);
    }

    /// Relative deviation of the grand totals.
    pub fn total_relative_error(&self) -> f64 {
        relative_error(self.input_total, self.output_total)
    }

    pub fn is_balanced(&self) -> bool {
        self.violations.is_empty()
    }
}

/// `|actual - expected| / |expected|`, or `|actual|` when nothing was expected.
pub fn relative_error(expected: f64, actual: f64) -> f64 {
    if expected.abs() > 0.0 {
        (actual - expected).abs() / expected.abs()
    } else {
        actual.abs()
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Balance Report ---")?;
        writeln!(f, "Series checked:        {}", self.series_checked)?;
        writeln!(f, "Input total:           {:.3} MWh", self.input_total)?;
        writeln!(f, "Output total:          {:.3} MWh", self.output_total)?;
        writeln!(f, "Max relative error:    {:.2e}", self.max_relative_error)?;
        write!(f, "Tolerance violations:  {}", self.violations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnergyCarrier, Region, Sector};

    fn key(sector: u8) -> SeriesKey {
        SeriesKey {
            sector: Sector::new(sector).expect("valid sector"),
            region: Region::new(6412).expect("valid region"),
            carrier: EnergyCarrier::Power,
            year: 2020,
            application: None,
        }
    }

    #[test]
    fn balanced_series_pass() {
        let expected = BTreeMap::from([(key(5), 4.0)]);
        let series = [TimeSeries {
            key: key(5),
            values: vec![1.0; 4],
        }];
        let report = BalanceReport::from_series(&expected, &series, 1e-4);
        assert!(report.is_balanced());
        assert_eq!(report.series_checked, 1);
        assert_eq!(report.max_relative_error, 0.0);
    }

    #[test]
    fn deviation_is_reported() {
        let expected = BTreeMap::from([(key(5), 4.0)]);
        let series = [TimeSeries {
            key: key(5),
            values: vec![1.0; 5],
        }];
        let report = BalanceReport::from_series(&expected, &series, 1e-4);
        assert_eq!(report.violations.len(), 1);
        assert!((report.max_relative_error - 0.25).abs() < 1e-12);
    }

    #[test]
    fn merge_accumulates() {
        let expected = BTreeMap::from([(key(5), 2.0), (key(6), 3.0)]);
        let mut a = BalanceReport::from_series(
            &expected,
            &[TimeSeries {
                key: key(5),
                values: vec![2.0],
            }],
            1e-4,
        );
        let b = BalanceReport::from_series(
            &expected,
            &[TimeSeries {
                key: key(6),
                values: vec![3.0],
            }],
            1e-4,
        );
        a.merge(b);
        assert_eq!(a.series_checked, 2);
        assert_eq!(a.input_total, 5.0);
        assert_eq!(a.total_relative_error(), 0.0);
    }

    #[test]
    fn empty_report() {
        let report = BalanceReport::from_series(&BTreeMap::new(), &[], 1e-4);
        assert_eq!(report.series_checked, 0);
        assert!(report.to_string().contains("Series checked"));
    }
}
