//! Crate-wide error type.
//!
//! Validation failures are fatal at construction time: no partially
//! initialized instance is ever produced. Solver outcomes such as
//! "infeasible" are *not* errors — they are terminal states reported
//! through [`crate::mip::SolveStatus`].

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised while building an instance or performing I/O.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A genre label did not match any tag of the closed enumeration.
    #[error("unknown genre label '{label}'")]
    UnknownGenre { label: String },

    /// The number of availability columns differs from the number of
    /// event day windows.
    #[error("event spans {days} day window(s) but the row carries {columns} availability column(s)")]
    DayCountMismatch { days: usize, columns: usize },

    /// A time window whose start is not strictly before its end.
    #[error("time window start {fr} is not before end {to}")]
    InvalidWindow { fr: NaiveDateTime, to: NaiveDateTime },

    /// A run estimate cell that is not `HH:MM:SS`.
    #[error("malformed run estimate '{value}' (expected HH:MM:SS)")]
    InvalidEstimate { value: String },

    /// An availability cell entry that is not a whole hour in 0..=23.
    #[error("availability hour '{value}' is not a whole hour in 0..=23")]
    InvalidHour { value: String },

    /// An input row with fewer columns than the format requires.
    #[error("row {row}: expected at least {expected} columns, found {found}")]
    MissingColumns {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// An event horizon that is empty, inverted, or out of range.
    #[error("invalid event horizon")]
    InvalidHorizon,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
