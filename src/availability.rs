//! Availability consolidation.
//!
//! Registration forms collect availability as ragged per-day hour lists
//! ("19, 20, 21" or the sentinels "all" / "none"). The assignment model
//! wants the opposite shape: a minimal ordered list of contiguous
//! eligibility windows. This module performs that conversion.
//!
//! # Algorithm
//!
//! Each day is scanned hour by hour with a two-state machine
//! {`Idle`, `Open(fr)`}:
//!
//! | state      | hour eligible | transition                                  |
//! |------------|---------------|---------------------------------------------|
//! | `Idle`     | no            | stay `Idle`                                 |
//! | `Idle`     | yes           | open at the day start or the hour top       |
//! | `Open(fr)` | yes           | stay `Open(fr)`                             |
//! | `Open(fr)` | no            | close at the hour top, back to `Idle`       |
//!
//! A window still open after the day's last hour closes at the day
//! boundary. A final pass merges windows that touch across midnight.

use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::models::TimeWindow;

/// One day's worth of availability, as registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayAvailability {
    /// Every hour of the day is eligible.
    All,
    /// No hour of the day is eligible.
    None,
    /// The listed whole hours (0..=23) are eligible.
    Hours(Vec<u8>),
}

impl DayAvailability {
    /// Whether the given hour of the day is eligible.
    pub fn contains(&self, hour: u32) -> bool {
        match self {
            DayAvailability::All => true,
            DayAvailability::None => false,
            DayAvailability::Hours(hours) => hours.iter().any(|&h| u32::from(h) == hour),
        }
    }
}

impl FromStr for DayAvailability {
    type Err = ScheduleError;

    /// Parses an availability cell: the sentinels `all` / `none`
    /// (case-insensitive), an empty cell (treated as `none`), or a
    /// comma-separated list of whole hours 0..=23.
    fn from_str(cell: &str) -> Result<Self, Self::Err> {
        let cell = cell.trim();
        if cell.is_empty() || cell.eq_ignore_ascii_case("none") {
            return Ok(DayAvailability::None);
        }
        if cell.eq_ignore_ascii_case("all") {
            return Ok(DayAvailability::All);
        }

        let mut hours = Vec::new();
        for part in cell.split(',') {
            let part = part.trim();
            let hour: u8 = part.parse().map_err(|_| ScheduleError::InvalidHour {
                value: part.to_string(),
            })?;
            if hour > 23 {
                return Err(ScheduleError::InvalidHour {
                    value: part.to_string(),
                });
            }
            hours.push(hour);
        }
        Ok(DayAvailability::Hours(hours))
    }
}

/// Hour-scan state: outside any eligibility run, or inside one that
/// opened at the recorded instant.
enum Scan {
    Idle,
    Open(chrono::NaiveDateTime),
}

/// Consolidates per-day hour lists into minimal merged windows.
///
/// `day_windows` must be the event's contiguous, sorted, one-per-day
/// windows; `days` holds one availability entry per day window.
///
/// Within a day, each maximal run of contiguous eligible hours yields
/// one window. The window start snaps to the day boundary when the run
/// begins at the day's first hour, otherwise to the top of its first
/// hour; the end snaps to the day boundary when the run reaches the
/// day's last hour, otherwise to the top of the first ineligible hour.
/// Windows touching across a day boundary are merged.
///
/// Hours listed outside the day window are ignored. A runner with no
/// eligible hours anywhere yields an empty list: a valid, but
/// unschedulable, input.
pub fn consolidate(
    day_windows: &[TimeWindow],
    days: &[DayAvailability],
) -> Result<Vec<TimeWindow>, ScheduleError> {
    if day_windows.len() != days.len() {
        return Err(ScheduleError::DayCountMismatch {
            days: day_windows.len(),
            columns: days.len(),
        });
    }

    let mut raw = Vec::new();
    for (day, hours) in day_windows.iter().zip(days) {
        let first = day.fr().hour();
        // Last whole hour touched by the half-open window.
        let last = (day.to() - Duration::seconds(1)).hour();
        let midnight = day.fr().date().and_time(NaiveTime::MIN);

        let mut state = Scan::Idle;
        for h in first..=last {
            state = match (state, hours.contains(h)) {
                (Scan::Idle, false) => Scan::Idle,
                (Scan::Idle, true) => Scan::Open(if h == first {
                    day.fr()
                } else {
                    midnight + Duration::hours(i64::from(h))
                }),
                (Scan::Open(fr), true) => Scan::Open(fr),
                (Scan::Open(fr), false) => {
                    raw.push(TimeWindow::unchecked(
                        fr,
                        midnight + Duration::hours(i64::from(h)),
                    ));
                    Scan::Idle
                }
            };
        }
        if let Scan::Open(fr) = state {
            raw.push(TimeWindow::unchecked(fr, day.to()));
        }
    }

    Ok(merge_contiguous(raw))
}

/// Merges adjacent windows whose boundaries touch exactly.
///
/// Input must be sorted by start. Idempotent: merged output passes
/// through unchanged.
pub fn merge_contiguous(windows: Vec<TimeWindow>) -> Vec<TimeWindow> {
    let mut merged: Vec<TimeWindow> = Vec::with_capacity(windows.len());
    for w in windows {
        match merged.last_mut() {
            Some(prev) if prev.to() == w.fr() => {
                *prev = TimeWindow::unchecked(prev.fr(), w.to());
            }
            _ => merged.push(w),
        }
    }
    merged
}
