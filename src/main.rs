use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info};
use market_pulse::{
    calendar::NEUTRAL_EXIT_CODE,
    commands::{check_calendar, fetch, run, summarize, RunStatus},
    config::{parse_date, Settings},
    context::AppContext,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "market-pulse")]
#[command(about = "Daily global market snapshot and summary builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch quotes, update history and write market_data.json
    Fetch {
        /// Project root containing the data/ and web/ output directories
        #[arg(long, value_name = "PATH", default_value = ".")]
        root: PathBuf,
        /// Run date (YYYY-MM-DD), defaults to today in UTC
        #[arg(long, value_name = "DATE", value_parser = parse_run_date)]
        date: Option<NaiveDate>,
    },
    /// Generate summary.json from the persisted snapshot
    Summarize {
        /// Project root containing the data/ and web/ output directories
        #[arg(long, value_name = "PATH", default_value = ".")]
        root: PathBuf,
    },
    /// Fetch and summarize in one go
    Run {
        /// Project root containing the data/ and web/ output directories
        #[arg(long, value_name = "PATH", default_value = ".")]
        root: PathBuf,
        /// Run date (YYYY-MM-DD), defaults to today in UTC
        #[arg(long, value_name = "DATE", value_parser = parse_run_date)]
        date: Option<NaiveDate>,
    },
    /// Report whether the date is a trading day (exit 78 when it is not)
    CheckCalendar {
        /// Date to check (YYYY-MM-DD), defaults to today in UTC
        #[arg(long, value_name = "DATE", value_parser = parse_run_date)]
        date: Option<NaiveDate>,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match execute(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::from_env()?;

    let status = match cli.command {
        Commands::Fetch { root, date } => fetch::run(&AppContext::initialize(settings, root, date))?,
        Commands::Summarize { root } => {
            summarize::run(&AppContext::initialize(settings, root, None))?;
            RunStatus::Completed
        }
        Commands::Run { root, date } => run::run(&AppContext::initialize(settings, root, date))?,
        Commands::CheckCalendar { date } => {
            check_calendar::run(&AppContext::initialize(settings, ".", date))
        }
    };

    Ok(exit_code(status))
}

fn exit_code(status: RunStatus) -> ExitCode {
    match status {
        RunStatus::Completed => {
            info!("Done");
            ExitCode::SUCCESS
        }
        RunStatus::Skipped(_) => ExitCode::from(NEUTRAL_EXIT_CODE),
    }
}

fn parse_run_date(raw: &str) -> Result<NaiveDate> {
    parse_date("--date", raw)
}
