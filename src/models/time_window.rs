//! Time window model.
//!
//! A closed-open interval of event-local wall-clock time. All interval
//! arithmetic in the crate is expressed through this type.
//!
//! # Time Model
//! Instants are `chrono::NaiveDateTime` (event-local, no timezone).
//! Durations are carried as whole seconds (`i64`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// A time interval [fr, to).
///
/// Half-open: includes `fr`, excludes `to`. The constructor rejects
/// empty and inverted intervals, so `fr < to` always holds.
/// Windows order by `(fr, to)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeWindow {
    fr: NaiveDateTime,
    to: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a new time window, rejecting `fr >= to`.
    pub fn new(fr: NaiveDateTime, to: NaiveDateTime) -> Result<Self, ScheduleError> {
        if fr < to {
            Ok(Self { fr, to })
        } else {
            Err(ScheduleError::InvalidWindow { fr, to })
        }
    }

    /// Constructs a window whose validity the caller has already established.
    pub(crate) fn unchecked(fr: NaiveDateTime, to: NaiveDateTime) -> Self {
        debug_assert!(fr < to);
        Self { fr, to }
    }

    /// Interval start (inclusive).
    #[inline]
    pub fn fr(&self) -> NaiveDateTime {
        self.fr
    }

    /// Interval end (exclusive).
    #[inline]
    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    /// Duration of this window in whole seconds.
    #[inline]
    pub fn duration_s(&self) -> i64 {
        (self.to - self.fr).num_seconds()
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.fr && at < self.to
    }

    /// Whether two windows overlap.
    ///
    /// Touching windows (`a.to == b.fr`) do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.fr < other.to && other.fr < self.to
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}--{}", self.fr, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_rejects_inverted() {
        assert!(TimeWindow::new(at(15, 19), at(16, 0)).is_ok());
        assert!(TimeWindow::new(at(16, 0), at(16, 0)).is_err());
        assert!(TimeWindow::new(at(16, 5), at(16, 0)).is_err());
    }

    #[test]
    fn test_duration_and_contains() {
        let w = TimeWindow::new(at(15, 19), at(16, 0)).unwrap();
        assert_eq!(w.duration_s(), 5 * 3600);
        assert!(w.contains(at(15, 19)));
        assert!(w.contains(at(15, 23)));
        assert!(!w.contains(at(16, 0))); // exclusive end
        assert!(!w.contains(at(15, 18)));
    }

    #[test]
    fn test_overlaps() {
        let a = TimeWindow::new(at(15, 19), at(15, 22)).unwrap();
        let b = TimeWindow::new(at(15, 21), at(16, 0)).unwrap();
        let c = TimeWindow::new(at(15, 22), at(16, 0)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // touching, not overlapping
    }

    #[test]
    fn test_ordering_by_start_then_end() {
        let a = TimeWindow::new(at(15, 19), at(15, 22)).unwrap();
        let b = TimeWindow::new(at(15, 19), at(16, 0)).unwrap();
        let c = TimeWindow::new(at(15, 20), at(15, 21)).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_serde_round_trip() {
        let w = TimeWindow::new(at(15, 19), at(16, 0)).unwrap();
        let json = serde_json::to_string(&w).unwrap();
        let back: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}
