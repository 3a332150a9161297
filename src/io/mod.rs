//! Tabular instance reading and schedule writing.
//!
//! # Input format
//!
//! One CSV row per runner; the row order fixes the 1-based runner id.
//! Leading columns `runner, partner, game, category, estimate, genre`,
//! then one availability column per event day, then `url, promo, note`.
//! `estimate` is `HH:MM:SS`; availability cells are the sentinels
//! `all` / `none` or comma-separated whole hours.
//!
//! # Output format
//!
//! One row per scheduling quantum across the horizon: a date column
//! (filled only at the horizon start and at midnight), the time of
//! day, and one column per session. A run's start quantum carries its
//! full label, the quantum before its end a closing id marker.
//!
//! Readers and writers are generic over `io::Read`/`io::Write`; the
//! path-based wrappers open files and, for writing, skip file creation
//! entirely when the schedule is empty.

use std::fs;
use std::path::Path;

use chrono::{Duration, Timelike};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::info;

use crate::availability::{self, DayAvailability};
use crate::config::SolveSettings;
use crate::error::ScheduleError;
use crate::models::{Assignment, Genre, Instance, Runner, Schedule, TimeWindow};

/// Fixed columns before the per-day availability block.
const LEADING_COLUMNS: usize = 6;
/// Fixed columns after the per-day availability block.
const TRAILING_COLUMNS: usize = 3;

/// Reads an instance file.
pub fn read_instance(
    path: &Path,
    day_windows: &[TimeWindow],
    settings: &SolveSettings,
) -> Result<Instance, ScheduleError> {
    let file = fs::File::open(path)?;
    read_instance_from(file, day_windows, settings)
}

/// Reads an instance from any CSV source.
///
/// `day_windows` are the event's contiguous per-day windows; each row
/// must carry exactly one availability column per day, or the
/// consolidation step fails fast with a day-count mismatch.
pub fn read_instance_from(
    reader: impl std::io::Read,
    day_windows: &[TimeWindow],
    settings: &SolveSettings,
) -> Result<Instance, ScheduleError> {
    let horizon = horizon_of(day_windows)?;
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut runners = Vec::new();
    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        runners.push(parse_row(row_idx, &record, day_windows, settings)?);
    }
    Ok(Instance::new(runners, horizon))
}

/// Overall horizon spanned by the day windows.
fn horizon_of(day_windows: &[TimeWindow]) -> Result<TimeWindow, ScheduleError> {
    match (day_windows.first(), day_windows.last()) {
        (Some(first), Some(last)) => TimeWindow::new(first.fr(), last.to()),
        _ => Err(ScheduleError::InvalidHorizon),
    }
}

/// Parses one registration row into a runner.
fn parse_row(
    row_idx: usize,
    record: &StringRecord,
    day_windows: &[TimeWindow],
    settings: &SolveSettings,
) -> Result<Runner, ScheduleError> {
    let expected = LEADING_COLUMNS + day_windows.len() + TRAILING_COLUMNS;
    if record.len() < expected {
        return Err(ScheduleError::MissingColumns {
            row: row_idx + 1,
            expected,
            found: record.len(),
        });
    }
    let availability_columns = record.len() - LEADING_COLUMNS - TRAILING_COLUMNS;
    let field = |i: usize| record.get(i).unwrap_or("");

    let mut name = field(0).to_string();
    let partner = field(1);
    if !partner.is_empty() {
        name.push_str(", ");
        name.push_str(partner);
    }

    let est_run_s = parse_estimate(field(4))?;
    let genre: Genre = field(5).parse()?;

    let mut days = Vec::with_capacity(availability_columns);
    for i in 0..availability_columns {
        days.push(field(LEADING_COLUMNS + i).parse::<DayAvailability>()?);
    }
    let windows = availability::consolidate(day_windows, &days)?;

    let url_idx = LEADING_COLUMNS + availability_columns;
    Ok(
        Runner::new((row_idx + 1) as u32, name, genre, est_run_s, settings)
            .with_game(field(2))
            .with_category(field(3))
            .with_windows(windows)
            .with_url(field(url_idx))
            .with_promo(field(url_idx + 1))
            .with_note(field(url_idx + 2)),
    )
}

/// Parses an `HH:MM:SS` estimate into seconds.
fn parse_estimate(cell: &str) -> Result<i64, ScheduleError> {
    let invalid = || ScheduleError::InvalidEstimate {
        value: cell.to_string(),
    };

    let parts: Vec<&str> = cell.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let hours: i64 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: i64 = parts[1].parse().map_err(|_| invalid())?;
    let seconds: i64 = parts[2].parse().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(invalid());
    }
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// One output row of the schedule grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    /// Calendar date, filled only at the horizon start and at midnight.
    pub date: String,
    /// Time of day, `HH:MM`.
    pub time: String,
    /// One cell per session lane.
    pub lanes: Vec<String>,
}

/// Builds the full grid of output rows, one per scheduling quantum.
pub fn solution_rows(
    instance: &Instance,
    sessions: usize,
    quantum_s: i64,
    schedule: &Schedule,
) -> Vec<OutputRow> {
    let mut rows = Vec::new();
    let mut at = instance.horizon.fr();
    while at < instance.horizon.to() {
        let date = if at == instance.horizon.fr() || (at.hour() == 0 && at.minute() == 0) {
            at.format("%Y/%m/%d").to_string()
        } else {
            String::new()
        };

        let mut lanes = vec![String::new(); sessions];
        for assignment in &schedule.assignments {
            if assignment.session < 1 || assignment.session > sessions {
                continue;
            }
            if at == assignment.window.fr() {
                lanes[assignment.session - 1] = opening_label(instance, assignment);
            }
            if at == assignment.window.to() - Duration::seconds(quantum_s) {
                lanes[assignment.session - 1] = format!("[{:02}]", assignment.runner_id);
            }
        }

        rows.push(OutputRow {
            date,
            time: at.format("%H:%M").to_string(),
            lanes,
        });
        at += Duration::seconds(quantum_s);
    }
    rows
}

/// The start-quantum cell: id, name, game, genre, category, estimate.
fn opening_label(instance: &Instance, assignment: &Assignment) -> String {
    match instance.runner(assignment.runner_id) {
        Some(r) => format!(
            "[{:02}] {}  {}, {}, {}, {}",
            r.id,
            r.name,
            r.game,
            r.genre,
            r.category,
            format_duration(r.est_run_s),
        ),
        None => format!("[{:02}]", assignment.runner_id),
    }
}

/// `H:MM:SS` rendering of a duration in seconds.
fn format_duration(seconds: i64) -> String {
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Writes the schedule grid to a file.
///
/// An empty schedule writes nothing and returns `false`.
pub fn write_solution(
    path: &Path,
    instance: &Instance,
    settings: &SolveSettings,
    schedule: &Schedule,
) -> Result<bool, ScheduleError> {
    if schedule.is_empty() {
        info!("schedule is empty; no output file written");
        return Ok(false);
    }
    let file = fs::File::create(path)?;
    write_solution_to(file, instance, settings, schedule)?;
    Ok(true)
}

/// Writes the schedule grid to any CSV sink.
pub fn write_solution_to(
    writer: impl std::io::Write,
    instance: &Instance,
    settings: &SolveSettings,
    schedule: &Schedule,
) -> Result<(), ScheduleError> {
    let sessions = settings.max_parallel_sessions;
    let mut csv_writer = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["date".to_string(), "time".to_string()];
    header.extend((1..=sessions).map(|j| format!("session {j}")));
    csv_writer.write_record(&header)?;

    for row in solution_rows(instance, sessions, settings.quantum_s, schedule) {
        let mut record = vec![row.date, row.time];
        record.extend(row.lanes);
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
