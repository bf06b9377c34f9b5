//! Console report for a finished run.

use std::collections::BTreeMap;
use std::fmt;

use crate::runner::{RunSummary, Stage};

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Report ({}) ---", self.year)?;
        writeln!(f, "Keys in:               {}", self.keys_in)?;
        writeln!(f, "Annual total:          {:.3} MWh", self.annual_total)?;
        writeln!(f, "Adjusted total:        {:.3} MWh", self.adjusted_total)?;
        writeln!(f, "Output total:          {:.3} MWh", self.output_total)?;
        writeln!(f, "Series written:        {}", self.series_written)?;
        writeln!(f, "Max relative error:    {:.2e}", self.max_relative_error)?;
        writeln!(f, "Total relative error:  {:.2e}", self.total_relative_error)?;
        write!(f, "Failed keys:           {}", self.failures.len())?;

        let mut by_stage: BTreeMap<Stage, usize> = BTreeMap::new();
        for failure in &self.failures {
            *by_stage.entry(failure.stage).or_default() += 1;
        }
        for (stage, count) in by_stage {
            write!(f, "\n  {:<20} {count}", stage_name(stage))?;
        }
        write!(f, "\nTolerance violations:  {}", self.violations.len())
    }
}

pub fn print_run_report(summary: &RunSummary) {
    println!("\n{summary}");
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Region => "region",
        Stage::Year => "year",
        Stage::Application => "application",
        Stage::Efficiency => "efficiency",
        Stage::Industry => "industry",
        Stage::Cts => "cts",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Region, Sector};
    use crate::runner::FailureRecord;

    fn summary() -> RunSummary {
        RunSummary {
            year: 2020,
            keys_in: 3,
            annual_total: 30.0,
            adjusted_total: 29.0,
            output_total: 20.0,
            series_written: 2,
            max_relative_error: 0.0,
            total_relative_error: 0.0,
            states: Vec::new(),
            failures: vec![FailureRecord {
                stage: Stage::Cts,
                sector: Sector::new(47).expect("valid sector"),
                region: Region::new(6412).expect("valid region"),
                error: "no profile".into(),
            }],
            violations: Vec::new(),
        }
    }

    #[test]
    fn report_lists_failures_by_stage() {
        let text = summary().to_string();
        assert!(text.starts_with("--- Run Report (2020) ---"));
        assert!(text.contains("Failed keys:           1"));
        assert!(text.contains("cts"));
        assert!(text.ends_with("Tolerance violations:  0"));
    }

    #[test]
    fn stages_are_listed_in_pipeline_order() {
        let mut s = summary();
        let off_year = FailureRecord {
            stage: Stage::Year,
            ..s.failures[0].clone()
        };
        s.failures.insert(0, off_year);
        let text = s.to_string();
        let year = text.find("  year").expect("year stage listed");
        let cts = text.find("  cts").expect("cts stage listed");
        assert!(year < cts);
    }
}
