//! Solve settings and tuning constants.
//!
//! One value object carries everything the pipeline needs beyond the
//! instance itself: the session count, the overrun policy, the solver
//! time budget, and the three timing constants that shape occupied
//! durations and window bounds.

use serde::{Deserialize, Serialize};

/// Settings for one solve.
///
/// Defaults reproduce the production event configuration: two parallel
/// sessions, overrun allowed, a ten-minute-per-run safety margin built
/// from a 4-minute buffer on a 5-minute grid, and a 600-second budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveSettings {
    /// Maximum number of parallel sessions K (>= 1). Session K is the
    /// unweighted overflow lane.
    pub max_parallel_sessions: usize,
    /// Whether a run may end after its eligibility window closes.
    pub allow_overrun: bool,
    /// Wall-clock budget handed to the solve engine, in seconds (>= 1).
    pub time_budget_s: u32,
    /// Buffer added to every raw run estimate (hand-over, setup,
    /// interviews), in seconds.
    pub buffer_s: i64,
    /// Scheduling quantum, in seconds (> 0). All offsets and occupied
    /// durations are multiples of this.
    pub quantum_s: i64,
    /// With overrun allowed: minimum gap required between a run's start
    /// and its window's end, in seconds. Runs shorter than this must
    /// still fit entirely.
    pub overrun_margin_s: i64,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            max_parallel_sessions: 2,
            allow_overrun: true,
            time_budget_s: 600,
            buffer_s: 4 * 60,
            quantum_s: 5 * 60,
            overrun_margin_s: 60 * 60,
        }
    }
}

impl SolveSettings {
    /// Creates settings with the default tuning constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of parallel sessions.
    pub fn with_sessions(mut self, max_parallel_sessions: usize) -> Self {
        self.max_parallel_sessions = max_parallel_sessions;
        self
    }

    /// Sets the overrun policy.
    pub fn with_overrun(mut self, allow_overrun: bool) -> Self {
        self.allow_overrun = allow_overrun;
        self
    }

    /// Sets the solver time budget in seconds.
    pub fn with_time_budget(mut self, time_budget_s: u32) -> Self {
        self.time_budget_s = time_budget_s;
        self
    }

    /// Sets the per-run buffer in seconds.
    pub fn with_buffer(mut self, buffer_s: i64) -> Self {
        self.buffer_s = buffer_s;
        self
    }

    /// Sets the scheduling quantum in seconds.
    pub fn with_quantum(mut self, quantum_s: i64) -> Self {
        self.quantum_s = quantum_s;
        self
    }

    /// Sets the minimum pre-window-end margin under overrun, in seconds.
    pub fn with_overrun_margin(mut self, overrun_margin_s: i64) -> Self {
        self.overrun_margin_s = overrun_margin_s;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SolveSettings::default();
        assert_eq!(s.max_parallel_sessions, 2);
        assert!(s.allow_overrun);
        assert_eq!(s.time_budget_s, 600);
        assert_eq!(s.buffer_s, 240);
        assert_eq!(s.quantum_s, 300);
        assert_eq!(s.overrun_margin_s, 3600);
    }

    #[test]
    fn test_builder_chain() {
        let s = SolveSettings::new()
            .with_sessions(3)
            .with_overrun(false)
            .with_time_budget(30)
            .with_quantum(60);
        assert_eq!(s.max_parallel_sessions, 3);
        assert!(!s.allow_overrun);
        assert_eq!(s.time_budget_s, 30);
        assert_eq!(s.quantum_s, 60);
    }
}
