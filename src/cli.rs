//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::State;

#[derive(Parser, Debug)]
#[command(name = "loadshape")]
#[command(
    version,
    about = "Spread annual industry and CTS energy consumption over quarter-hours"
)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full disaggregation and write series
    Run {
        /// TOML run configuration
        #[arg(short, long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Built-in preset (industry_power, cts_power, all_gas)
        #[arg(short, long)]
        preset: Option<String>,

        /// Override the profile year
        #[arg(short, long)]
        year: Option<i32>,

        /// Override the factor directory
        #[arg(long)]
        factors: Option<PathBuf>,

        /// Override the consumption CSV
        #[arg(long)]
        consumption: Option<PathBuf>,

        /// Override the holiday CSV
        #[arg(long)]
        holidays: Option<PathBuf>,

        /// Override the series output CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON run summary
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },

    /// Dump the shift profiles of one state
    Profiles {
        /// Federal state abbreviation or code
        #[arg(long)]
        state: State,

        #[arg(long, default_value_t = 2020)]
        year: i32,

        /// Holiday CSV
        #[arg(long)]
        holidays: Option<PathBuf>,

        /// TOML run configuration providing shift windows
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output CSV
        #[arg(short, long, default_value = "shift_profiles.csv")]
        output: PathBuf,
    },

    /// Load and validate a factor directory
    Check {
        /// Directory containing the factor CSV sheets
        #[arg(long)]
        factors: PathBuf,

        /// Year the efficiency curves start from
        #[arg(long, default_value_t = 2019)]
        base_year: i32,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
