//! Problem instance model.
//!
//! Bundles the runner set with the event horizon. The horizon bounds all
//! offset arithmetic in the assignment model; every eligibility window of
//! every runner lies inside it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::models::{Runner, TimeWindow};

/// A scheduling problem instance: runners plus the event horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Runners, in id order.
    pub runners: Vec<Runner>,
    /// Overall event window spanning all days.
    pub horizon: TimeWindow,
}

impl Instance {
    /// Creates an instance.
    pub fn new(runners: Vec<Runner>, horizon: TimeWindow) -> Self {
        Self { runners, horizon }
    }

    /// Number of runners.
    pub fn runner_count(&self) -> usize {
        self.runners.len()
    }

    /// Looks up a runner by id.
    pub fn runner(&self, id: u32) -> Option<&Runner> {
        self.runners.iter().find(|r| r.id == id)
    }
}

/// Splits an event horizon into per-calendar-day windows.
///
/// The first window starts at `fr`, the last ends at `to`; interior
/// boundaries fall on midnight. The result is contiguous and sorted,
/// one window per calendar day touched by the horizon — the shape the
/// availability consolidator expects.
pub fn day_windows(fr: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<TimeWindow>, ScheduleError> {
    if fr >= to {
        return Err(ScheduleError::InvalidHorizon);
    }

    let mut windows = Vec::new();
    let mut cursor = fr;
    while cursor < to {
        let next_midnight = cursor
            .date()
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or(ScheduleError::InvalidHorizon)?;
        let end = next_midnight.min(to);
        windows.push(TimeWindow::new(cursor, end)?);
        cursor = end;
    }
    Ok(windows)
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
    fn test_day_windows_splits_at_midnight() {
        let days = day_windows(at(15, 19), at(18, 0)).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].fr(), at(15, 19));
        assert_eq!(days[0].to(), at(16, 0));
        assert_eq!(days[1].fr(), at(16, 0));
        assert_eq!(days[1].to(), at(17, 0));
        assert_eq!(days[2].fr(), at(17, 0));
        assert_eq!(days[2].to(), at(18, 0));
    }

    #[test]
    fn test_day_windows_partial_last_day() {
        let days = day_windows(at(15, 19), at(16, 6)).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].fr(), at(16, 0));
        assert_eq!(days[1].to(), at(16, 6));
    }

    #[test]
    fn test_day_windows_single_day() {
        let days = day_windows(at(15, 9), at(15, 21)).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].fr(), at(15, 9));
        assert_eq!(days[0].to(), at(15, 21));
    }

    #[test]
    fn test_day_windows_contiguous() {
        let days = day_windows(at(15, 19), at(18, 0)).unwrap();
        for pair in days.windows(2) {
            assert_eq!(pair[0].to(), pair[1].fr());
        }
    }

    #[test]
    fn test_day_windows_rejects_empty_horizon() {
        assert!(day_windows(at(15, 19), at(15, 19)).is_err());
        assert!(day_windows(at(16, 0), at(15, 19)).is_err());
    }
}
