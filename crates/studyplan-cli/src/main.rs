//! studyplan CLI - Weekly study-plan optimizer
//!
//! Command-line interface for validating and solving study-plan requests.

mod report;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use studyplan_core::calendar::{self, SLOTS_PER_DAY};
use studyplan_core::{Config, CpSolver, PlanOutcome, Planner, PreferenceTag, ScheduleRequest, SolverBackend};
use studyplan_solver::{planner_from_config, StudyPlanner};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use report::{render_json, render_text, OutputFormat};

#[derive(Parser)]
#[command(name = "studyplan")]
#[command(author, version, about = "Weekly study-plan optimizer", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, env = "STUDYPLAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a request file
    Check {
        /// Request file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compute study plans for one or more request files
    Solve {
        /// Request files (JSON), solved in parallel
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Wall-clock budget per request, in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,

        /// Solver backend (search, pumpkin)
        #[arg(long)]
        backend: Option<SolverBackend>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Emit status and objective alongside the entries (json format)
        #[arg(long)]
        detailed: bool,

        /// Calendar date of day 0, for dated text output
        #[arg(long, value_name = "DATE")]
        week_start: Option<NaiveDate>,
    },

    /// List the recognized preference tags
    Catalog,
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Check { file }) => cmd_check(&file),
        Some(Commands::Solve {
            files,
            time_limit_ms,
            backend,
            format,
            detailed,
            week_start,
        }) => {
            let mut config = Config::load_or_default(cli.config.as_deref())?;
            if let Some(ms) = time_limit_ms {
                config.solver.time_limit_ms = ms;
            }
            if let Some(backend) = backend {
                config.solver.backend = backend;
            }
            let planner = planner_from_config(&config.solver)?;
            cmd_solve(&planner, &files, format, detailed, week_start)
        }
        Some(Commands::Catalog) => {
            cmd_catalog();
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("studyplan - Weekly study-plan optimizer");
            println!("Run with --help for usage information");
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_request(file: &Path) -> Result<ScheduleRequest> {
    let request = ScheduleRequest::load(file)?;
    request
        .validate()
        .with_context(|| format!("Invalid request in {}", file.display()))?;
    Ok(request)
}

fn cmd_check(file: &Path) -> Result<ExitCode> {
    match load_request(file) {
        Ok(request) => {
            println!(
                "{}: ok ({} tasks, {} fixed blocks, {} blocked days, horizon {} slots / {} days)",
                file.display(),
                request.tasks.len(),
                request.fixed_blocks.len(),
                request.blocked_days.len(),
                request.horizon,
                request.horizon / SLOTS_PER_DAY
            );
            let preferences = request.preferences();
            if !preferences.is_empty() {
                println!("  preferences: {}", preferences);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn solve_file<S: CpSolver>(planner: &StudyPlanner<S>, file: &Path) -> Result<PlanOutcome> {
    let request = ScheduleRequest::load(file)?;
    tracing::info!(file = %file.display(), tasks = request.tasks.len(), "solving");
    planner
        .plan(&request)
        .with_context(|| format!("Invalid request in {}", file.display()))
}

fn cmd_solve<S: CpSolver>(
    planner: &StudyPlanner<S>,
    files: &[PathBuf],
    format: OutputFormat,
    detailed: bool,
    week_start: Option<NaiveDate>,
) -> Result<ExitCode> {
    let results: Vec<Result<PlanOutcome>> = files
        .par_iter()
        .map(|file| solve_file(planner, file))
        .collect();

    let mut failed = false;
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(outcome) => match format {
                OutputFormat::Json => println!("{}", render_json(&outcome, detailed)?),
                OutputFormat::Text => {
                    print!("{}", render_text(&file.display().to_string(), &outcome, week_start));
                }
            },
            Err(e) => {
                failed = true;
                eprintln!("error: {:#}", e);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_catalog() {
    println!("{:<12} {:<10} {}", "TAG", "ALIAS", "HOURS");
    for tag in PreferenceTag::ALL {
        let (from, to) = tag.hours();
        println!("{:<12} {:<10} {:02}:00-{:02}:00", tag.token(), tag.alias(), from, to);
    }
    println!();
    println!(
        "Rest: 00:00-{:02}:00 and {:02}:00-24:00 every day",
        calendar::NIGHT_END_HOUR,
        calendar::NIGHT_START_HOUR
    );
}
