//! loadshape entry point: CLI wiring and config-driven pipeline construction.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{error, info, warn};

use loadshape::calendar::{DayTypeSource, HolidayCalendar, WeekendsOnly};
use loadshape::cli::{Cli, Commands};
use loadshape::config::RunConfig;
use loadshape::disagg::ShiftProfiles;
use loadshape::factors::{ShiftDefinitions, Tolerance};
use loadshape::io::consumption::read_consumption_file;
use loadshape::io::export::{CsvSeriesSink, export_profiles_csv, export_summary_json};
use loadshape::io::factor_dir::load_factor_store;
use loadshape::io::holidays::read_holidays_file;
use loadshape::reporting::print_run_report;
use loadshape::runner::Pipeline;
use loadshape::telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    telemetry::init(cli.verbose).map_err(|e| anyhow!(e))?;

    match cli.command {
        Commands::Run {
            config,
            preset,
            year,
            factors,
            consumption,
            holidays,
            output,
            summary,
        } => {
            let mut cfg = match (config, preset) {
                (Some(path), _) => RunConfig::from_toml_file(&path)?,
                (None, Some(name)) => RunConfig::from_preset(&name)?,
                (None, None) => RunConfig::default(),
            };
            if let Some(y) = year {
                cfg.run.year = y;
            }
            if let Some(p) = factors {
                cfg.paths.factors = p;
            }
            if let Some(p) = consumption {
                cfg.paths.consumption = p;
            }
            if holidays.is_some() {
                cfg.paths.holidays = holidays;
            }
            if let Some(p) = output {
                cfg.paths.output = p;
            }
            if summary.is_some() {
                cfg.paths.summary = summary;
            }
            run(&cfg)
        }

        Commands::Profiles {
            state,
            year,
            holidays,
            config,
            output,
        } => {
            let definitions = match config {
                Some(path) => RunConfig::from_toml_file(&path)?.shifts.to_definitions()?,
                None => ShiftDefinitions::default(),
            };
            let calendar = load_holidays(holidays.as_deref())?;
            let days = day_source(calendar.as_ref());
            let profiles = ShiftProfiles::generate(state, year, &definitions, days)?;
            export_profiles_csv(&profiles, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} quarter-hours of shift profiles for {} {year} to {}",
                profiles.len(),
                state.name(),
                output.display()
            );
            Ok(())
        }

        Commands::Check { factors, base_year } => {
            let store = load_factor_store(
                &factors,
                base_year,
                ShiftDefinitions::default(),
                Tolerance::default(),
            )
            .with_context(|| format!("checking factor directory {}", factors.display()))?;
            println!(
                "Factor tables OK: {} share vectors, {} rate schedules, {} load profiles",
                store.shares().len(),
                store.efficiency().len(),
                store.slp().len()
            );
            Ok(())
        }
    }
}

fn run(cfg: &RunConfig) -> Result<()> {
    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        bail!("invalid configuration ({} errors)", errors.len());
    }

    let definitions = cfg.shifts.to_definitions()?;
    let paths = &cfg.paths;
    let store = load_factor_store(&paths.factors, cfg.run.base_year, definitions, cfg.tolerance)
        .with_context(|| format!("loading factors from {}", paths.factors.display()))?;
    let calendar = load_holidays(paths.holidays.as_deref())?;
    let consumption = read_consumption_file(&paths.consumption)
        .with_context(|| format!("reading consumption from {}", paths.consumption.display()))?;

    let mut sink = CsvSeriesSink::create(&paths.output)?;
    let pipeline = Pipeline::new(&store, day_source(calendar.as_ref()), cfg.run_options());
    let summary = pipeline.run(&consumption, &mut sink)?;
    let rows = sink.rows();
    sink.finish()?;
    info!(rows, path = %paths.output.display(), "series written");

    if let Some(path) = &paths.summary {
        export_summary_json(&summary, path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }
    if !summary.is_clean() {
        warn!(
            failures = summary.failures.len(),
            violations = summary.violations.len(),
            "run finished with problems; see the summary for details"
        );
    }
    print_run_report(&summary);
    Ok(())
}

fn load_holidays(path: Option<&Path>) -> Result<Option<HolidayCalendar>> {
    path.map(|p| {
        read_holidays_file(p).with_context(|| format!("reading holidays from {}", p.display()))
    })
    .transpose()
}

fn day_source(calendar: Option<&HolidayCalendar>) -> &dyn DayTypeSource {
    match calendar {
        Some(c) => c,
        None => &WeekendsOnly,
    }
}
