//! Command-line entry point.
//!
//! Reads a registration CSV, solves the session assignment, and writes
//! the schedule grid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use marathon_scheduler::config::SolveSettings;
use marathon_scheduler::io;
use marathon_scheduler::mip::ScheduleModelBuilder;
use marathon_scheduler::models::day_windows;

#[derive(Parser)]
#[command(name = "marathon-scheduler")]
#[command(about = "Assigns event runners to parallel sessions")]
struct Cli {
    /// Registration CSV, one row per runner
    #[arg(long, default_value = "input/instance.csv")]
    input: PathBuf,

    /// Output schedule CSV
    #[arg(long, default_value = "output/solution.csv")]
    output: PathBuf,

    /// Event start, "YYYY-MM-DD HH:MM"
    #[arg(long)]
    event_start: String,

    /// Event end, "YYYY-MM-DD HH:MM"
    #[arg(long)]
    event_end: String,

    /// Maximum number of parallel sessions
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    sessions: u32,

    /// Forbid runs from ending after their availability window closes
    #[arg(long)]
    no_overrun: bool,

    /// Solver time budget in seconds
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    time_budget: u32,
}

fn parse_event_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .with_context(|| format!("invalid event time '{value}' (expected YYYY-MM-DD HH:MM)"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let fr = parse_event_time(&cli.event_start)?;
    let to = parse_event_time(&cli.event_end)?;
    let days = day_windows(fr, to)?;

    let settings = SolveSettings::default()
        .with_sessions(cli.sessions as usize)
        .with_overrun(!cli.no_overrun)
        .with_time_budget(cli.time_budget);

    let instance = io::read_instance(&cli.input, &days, &settings)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    info!(
        runners = instance.runner_count(),
        days = days.len(),
        "instance loaded"
    );

    let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
    info!(
        ?status,
        assignments = schedule.assignment_count(),
        "solve finished"
    );

    if io::write_solution(&cli.output, &instance, &settings, &schedule)? {
        info!(output = %cli.output.display(), "schedule written");
    }
    Ok(())
}
