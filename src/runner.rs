//! State-chunked run pipeline: application split, efficiency adjustment and
//! temporal disaggregation, streamed to a [`SeriesSink`] one state at a time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calendar::DayTypeSource;
use crate::disagg::{
    ApplicationDisaggregator, BalanceReport, CtsDisaggregator, DayWeighting, KeyFailure,
    ShiftProfileSet, ShiftProfiles, apply_efficiency, relative_error, temporal_industry,
};
use crate::error::{DisaggError, LoadError};
use crate::factors::FactorStore;
use crate::model::{
    AnnualConsumption, AnnualTable, EnergyCarrier, Region, Sector, SectorKind, State, TimeSeries,
};

/// Which sector group a run covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorScope {
    Industry,
    Cts,
    #[default]
    All,
}

impl SectorScope {
    pub fn includes(self, kind: SectorKind) -> bool {
        match self {
            Self::Industry => kind == SectorKind::Industry,
            Self::Cts => kind == SectorKind::Cts,
            Self::All => true,
        }
    }
}

/// Receives finished series, one state chunk at a time.
pub trait SeriesSink {
    fn accept(&mut self, state: State, series: &[TimeSeries]) -> Result<(), LoadError>;
}

impl SeriesSink for Vec<TimeSeries> {
    fn accept(&mut self, _state: State, series: &[TimeSeries]) -> Result<(), LoadError> {
        self.extend_from_slice(series);
        Ok(())
    }
}

/// Run parameters independent of the factor tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Profile year; also the efficiency target year.
    pub year: i32,
    /// Year of the consumption rows when efficiency is applied.
    pub base_year: i32,
    pub apply_efficiency: bool,
    pub scope: SectorScope,
    /// Restrict to one carrier; `None` keeps every carrier.
    pub carrier: Option<EnergyCarrier>,
    pub day_weighting: DayWeighting,
}

impl RunOptions {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            base_year: year,
            apply_efficiency: true,
            scope: SectorScope::All,
            carrier: None,
            day_weighting: DayWeighting::Uniform,
        }
    }

    /// Year every input row must carry: the base year when rows are projected
    /// with efficiency curves, the profile year otherwise.
    pub fn input_year(&self) -> i32 {
        if self.apply_efficiency {
            self.base_year
        } else {
            self.year
        }
    }
}

/// Stage at which a key failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Region,
    Year,
    Application,
    Efficiency,
    Industry,
    Cts,
}

/// A failed key as reported in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub stage: Stage,
    pub sector: Sector,
    pub region: Region,
    pub error: String,
}

/// Failure records with repeats of the same (stage, sector, region, error)
/// collapsed, e.g. one industry failure per application.
#[derive(Default)]
struct FailureLog {
    seen: BTreeSet<(Stage, Sector, Region, String)>,
    records: Vec<FailureRecord>,
}

impl FailureLog {
    fn push(&mut self, stage: Stage, sector: Sector, region: Region, error: &DisaggError) {
        let error = error.to_string();
        if self.seen.insert((stage, sector, region, error.clone())) {
            self.records.push(FailureRecord {
                stage,
                sector,
                region,
                error,
            });
        }
    }

    fn extend(&mut self, stage: Stage, failures: &[KeyFailure]) {
        for f in failures {
            self.push(stage, f.sector, f.region, &f.error);
        }
    }
}

/// Per-state totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub state: State,
    pub series: usize,
    pub input_total: f64,
    pub output_total: f64,
}

/// Outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub year: i32,
    /// Consumption rows considered after scope and carrier filtering.
    pub keys_in: usize,
    /// Annual total of those rows before efficiency adjustment.
    pub annual_total: f64,
    /// Annual total handed to the temporal stage.
    pub adjusted_total: f64,
    pub output_total: f64,
    pub series_written: usize,
    pub max_relative_error: f64,
    pub total_relative_error: f64,
    pub states: Vec<StateSummary>,
    pub failures: Vec<FailureRecord>,
    pub violations: Vec<String>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.violations.is_empty()
    }
}

/// Orchestrates one run over a consumption table.
pub struct Pipeline<'a> {
    store: &'a FactorStore,
    days: &'a dyn DayTypeSource,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a FactorStore, days: &'a dyn DayTypeSource, options: RunOptions) -> Self {
        Self {
            store,
            days,
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs every stage and streams each state's series to `sink`.
    ///
    /// Per-key errors are collected in the summary. Only a sink failure or a
    /// failure to build a state's shift profiles aborts the run.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when the sink rejects a chunk or shift profiles
    /// cannot be built.
    pub fn run(
        &self,
        consumption: &AnnualConsumption,
        sink: &mut dyn SeriesSink,
    ) -> Result<RunSummary, LoadError> {
        let opts = &self.options;
        let tolerance = self.store.tolerance();
        let selected: AnnualConsumption = consumption
            .iter()
            .filter(|(k, _)| opts.scope.includes(k.sector.kind()))
            .filter(|(k, _)| opts.carrier.is_none_or(|c| c == k.carrier))
            .map(|(k, v)| (*k, v))
            .collect();
        info!(
            year = opts.year,
            keys = selected.len(),
            total = selected.total(),
            "starting run"
        );

        let mut failures = FailureLog::default();
        for k in selected.stateless_keys() {
            let error = DisaggError::UnknownState { region: k.region };
            failures.push(Stage::Region, k.sector, k.region, &error);
        }

        // Rows of another year would collide once re-keyed to the run year.
        let input_year = opts.input_year();
        let mut located = AnnualConsumption::new();
        for (k, v) in selected.iter() {
            if k.region.state().is_none() {
                continue;
            }
            if k.year != input_year {
                let error = DisaggError::YearMismatch {
                    expected: input_year,
                    found: k.year,
                };
                failures.push(Stage::Year, k.sector, k.region, &error);
                continue;
            }
            located.insert(*k, v);
        }

        let (by_app, app_failures) = ApplicationDisaggregator::from_store(self.store)
            .run(&located)
            .into_parts();
        failures.extend(Stage::Application, &app_failures);

        let adjusted = if opts.apply_efficiency {
            let (adjusted, eff_failures) =
                apply_efficiency(&by_app, self.store.efficiency(), opts.year).into_parts();
            failures.extend(Stage::Efficiency, &eff_failures);
            adjusted
        } else {
            by_app
        };

        let cts = CtsDisaggregator::from_store(self.store, self.days)
            .with_weighting(&opts.day_weighting);
        let mut balance = BalanceReport::default();
        let mut states = Vec::new();

        for (i, state) in State::ALL.into_iter().enumerate() {
            let chunk = adjusted.for_state(state);
            if chunk.is_empty() {
                continue;
            }
            info!(
                state = %state,
                rows = chunk.len(),
                "state {}/{}",
                i + 1,
                State::ALL.len()
            );

            let mut series = Vec::new();
            let industry = chunk.for_kind(SectorKind::Industry);
            if !industry.is_empty() {
                let profiles = ShiftProfileSet::from(ShiftProfiles::generate(
                    state,
                    opts.year,
                    self.store.shifts(),
                    self.days,
                )?);
                let (out, errs) =
                    temporal_industry(&industry, &profiles, self.store.sector_shifts())
                        .into_parts();
                failures.extend(Stage::Industry, &errs);
                series.extend(out);
            }
            let services = chunk.for_kind(SectorKind::Cts);
            if !services.is_empty() {
                let (out, errs) = cts.run(&services).into_parts();
                failures.extend(Stage::Cts, &errs);
                series.extend(out);
            }

            let expected: BTreeMap<_, _> = chunk.series_inputs().into_iter().collect();
            let report = BalanceReport::from_series(&expected, &series, tolerance.totals);
            for v in &report.violations {
                warn!(state = %state, "{v}");
            }
            states.push(StateSummary {
                state,
                series: series.len(),
                input_total: report.input_total,
                output_total: report.output_total,
            });
            balance.merge(report);

            sink.accept(state, &series)?;
        }

        let mut violations: Vec<String> =
            balance.violations.iter().map(ToString::to_string).collect();
        let grand_error = relative_error(balance.input_total, balance.output_total);
        if grand_error > tolerance.totals {
            let v = DisaggError::ToleranceViolation {
                key: "grand total".into(),
                expected: balance.input_total,
                actual: balance.output_total,
                relative_error: grand_error,
            };
            warn!("{v}");
            violations.push(v.to_string());
        }
        let failures = failures.records;
        if !failures.is_empty() {
            warn!(failed = failures.len(), "some keys could not be processed");
        }
        info!(
            series = balance.series_checked,
            output_total = balance.output_total,
            "run finished"
        );

        Ok(RunSummary {
            year: opts.year,
            keys_in: selected.len(),
            annual_total: selected.total(),
            adjusted_total: adjusted.total(),
            output_total: balance.output_total,
            series_written: balance.series_checked,
            max_relative_error: balance.max_relative_error,
            total_relative_error: grand_error,
            states,
            failures,
            violations,
        })
    }
}
