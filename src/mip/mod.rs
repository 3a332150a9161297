//! MIP assignment formulation.
//!
//! Translates an [`Instance`] into a mixed-integer program over the
//! `good_lp` variables/constraints/objective interface, runs one
//! synchronous solve under the configured time budget, and decodes the
//! engine's variable values back into a [`Schedule`].
//!
//! # Formulation
//!
//! All offsets are quantized: one unit is one scheduling quantum, zero
//! is the horizon start.
//!
//! - `t[r]` — continuous start offset of runner `r`, bounded to
//!   `[0, horizon − occupied(r)]`
//! - `w[r,i]` — binary, `r` starts inside its i-th eligibility window;
//!   exactly one per runner
//! - `s[r,j]` — binary, `r` runs in session `j`; exactly one per runner
//! - `z[a,b]` — binary, `a` finishes before `b` starts (ordered pairs)
//!
//! Window linkage pins `t[r]` inside the chosen window with big-M
//! relaxation on the unchosen ones; under the overrun policy only
//! `min(occupied, margin)` must fit before the window end. Lane
//! exclusivity forces exactly one precedence direction between
//! co-assigned runners, and the precedence constraints are the sole
//! source of overlap prevention.
//!
//! The objective packs earlier sessions first: session `j` contributes
//! `weight_j * (horizon − Σ occupied(r)·s[r,j])`, with weights falling
//! geometrically by a base large enough that each session dominates all
//! later ones. The last session has weight zero and acts as the
//! overflow lane.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{Duration, NaiveDateTime};
use good_lp::{
    constraint, default_solver, variable, variables, Expression, ProblemVariables,
    ResolutionError, Solution, SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SolveSettings;
use crate::models::{Assignment, Instance, Runner, Schedule, TimeWindow};

/// Binary indicator values above `1 − INTEGER_TOLERANCE` count as set.
const INTEGER_TOLERANCE: f64 = 1e-6;

/// Slack added to a continuous start offset before flooring it back to
/// a quantum index.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Terminal state of one solve.
///
/// `Infeasible` and `NoSolutionFound` are ordinary outcomes, not
/// errors: both surface as an empty schedule, and the caller decides
/// whether to relax the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The engine finished within the budget.
    Optimal,
    /// The engine hit the budget but still produced an incumbent.
    Feasible,
    /// The budget ran out before any incumbent was found.
    NoSolutionFound,
    /// The model is proven unsatisfiable.
    Infeasible,
}

impl SolveStatus {
    /// Whether this status carries an extracted assignment.
    pub fn is_solution_found(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Decision variables of one model build.
struct DecisionVars {
    /// `t[r]`, indexed by runner position.
    start: Vec<Variable>,
    /// `w[r,i]`, keyed by (runner position, window position).
    in_window: HashMap<(usize, usize), Variable>,
    /// `s[r,j]`, keyed by (runner position, 1-based session).
    in_session: HashMap<(usize, usize), Variable>,
    /// `z[a,b]`, keyed by ordered (runner position, runner position).
    precedes: HashMap<(usize, usize), Variable>,
}

/// Builds and solves the session-assignment MIP for one instance.
///
/// Borrows the instance and settings read-only for a single solve and
/// never mutates them.
///
/// # Example
/// ```no_run
/// use marathon_scheduler::config::SolveSettings;
/// use marathon_scheduler::mip::ScheduleModelBuilder;
/// # fn demo(instance: marathon_scheduler::models::Instance) {
/// let settings = SolveSettings::default();
/// let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
/// # }
/// ```
pub struct ScheduleModelBuilder<'a> {
    instance: &'a Instance,
    settings: &'a SolveSettings,
}

impl<'a> ScheduleModelBuilder<'a> {
    /// Creates a builder over an instance and settings.
    pub fn new(instance: &'a Instance, settings: &'a SolveSettings) -> Self {
        Self { instance, settings }
    }

    /// Builds the model, solves it once under the time budget, and
    /// decodes the result.
    ///
    /// Only `Optimal` and `Feasible` outcomes carry assignments; the
    /// other two return an empty schedule after emitting a diagnostic.
    pub fn solve(&self) -> (Schedule, SolveStatus) {
        let mut vars = variables!();
        let dv = self.add_variables(&mut vars);
        let objective = self.objective(&dv);

        info!(
            runners = self.instance.runner_count(),
            sessions = self.settings.max_parallel_sessions,
            budget_s = self.settings.time_budget_s,
            "solving session assignment model"
        );

        let mut model = vars.minimise(objective.clone()).using(default_solver);
        model.set_parameter("logLevel", "0");
        model.set_parameter("seconds", &self.settings.time_budget_s.to_string());

        // Mirror of the objective expression as an explicit lower bound.
        let model = model.with(constraint!(objective >= 0.0));
        let model = self.constrain(model, &dv);

        let budget = std::time::Duration::from_secs(u64::from(self.settings.time_budget_s));
        let started = Instant::now();
        match model.solve() {
            Ok(solution) => {
                // The backend does not report incumbent optimality, so a
                // solution arriving at or past the deadline is classified
                // as a time-limited incumbent.
                let status = if started.elapsed() >= budget {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Optimal
                };
                (self.decode_solution(&solution, &dv), status)
            }
            Err(ResolutionError::Infeasible) => {
                warn!(
                    "assignment model proven infeasible; consider more sessions, \
                     allowing overrun, or wider availability"
                );
                (Schedule::new(), SolveStatus::Infeasible)
            }
            Err(error) => {
                warn!(
                    %error,
                    budget_s = self.settings.time_budget_s,
                    "no assignment found within the time budget"
                );
                (Schedule::new(), SolveStatus::NoSolutionFound)
            }
        }
    }

    /// Registers all decision variables.
    fn add_variables(&self, vars: &mut ProblemVariables) -> DecisionVars {
        let horizon_units = self.units(self.instance.horizon.to());
        let runner_count = self.instance.runners.len();
        let sessions = self.settings.max_parallel_sessions;

        let mut dv = DecisionVars {
            start: Vec::with_capacity(runner_count),
            in_window: HashMap::new(),
            in_session: HashMap::new(),
            precedes: HashMap::new(),
        };

        for (r_idx, runner) in self.instance.runners.iter().enumerate() {
            let start_ub = (horizon_units - self.occupied_units(runner)) as f64;
            dv.start.push(vars.add(variable().min(0.0).max(start_ub)));

            for w_idx in 0..runner.windows.len() {
                dv.in_window
                    .insert((r_idx, w_idx), vars.add(variable().binary()));
            }
            for j in 1..=sessions {
                dv.in_session
                    .insert((r_idx, j), vars.add(variable().binary()));
            }
        }

        for a in 0..runner_count {
            for b in 0..runner_count {
                if a != b {
                    dv.precedes.insert((a, b), vars.add(variable().binary()));
                }
            }
        }

        dv
    }

    /// The weighted packing objective.
    fn objective(&self, dv: &DecisionVars) -> Expression {
        let horizon_units = self.units(self.instance.horizon.to()) as f64;
        let weights = self.session_weights();

        let mut objective = Expression::from(0.0);
        for (j, &weight) in weights.iter().enumerate().map(|(i, w)| (i + 1, w)) {
            if weight == 0.0 {
                continue;
            }
            objective = objective + Expression::from(weight * horizon_units);
            for (r_idx, runner) in self.instance.runners.iter().enumerate() {
                let occupied = self.occupied_units(runner) as f64;
                objective = objective - dv.in_session[&(r_idx, j)] * (weight * occupied);
            }
        }
        objective
    }

    /// Per-session objective weights, 1-based session at index 0.
    ///
    /// Base `10^d`, where `d` is the decimal digit count of the horizon
    /// length in quanta, guarantees each session's term dominates the
    /// largest possible packing gap of every later session. The final
    /// session is the overflow lane and weighs nothing.
    fn session_weights(&self) -> Vec<f64> {
        let sessions = self.settings.max_parallel_sessions;
        let horizon_units = self.units(self.instance.horizon.to());
        let base = 10f64.powi(horizon_units.to_string().len() as i32);

        (1..=sessions)
            .map(|j| {
                if j == sessions {
                    0.0
                } else {
                    base.powi((sessions - 1 - j) as i32)
                }
            })
            .collect()
    }

    /// Adds every constraint family to the model.
    fn constrain<M: SolverModel>(&self, mut model: M, dv: &DecisionVars) -> M {
        let runners = &self.instance.runners;
        let sessions = self.settings.max_parallel_sessions;
        let horizon_units = self.units(self.instance.horizon.to()) as f64;
        let margin_units = self.settings.overrun_margin_s / self.settings.quantum_s;

        // Exactly one eligibility window and one session per runner.
        // A runner without windows makes the window sum empty, which
        // renders the model infeasible rather than silently dropping
        // the runner.
        for (r_idx, runner) in runners.iter().enumerate() {
            let window_sum = (0..runner.windows.len())
                .fold(Expression::from(0.0), |acc, w_idx| {
                    acc + dv.in_window[&(r_idx, w_idx)]
                });
            model = model.with(constraint!(window_sum == 1.0));

            let session_sum = (1..=sessions).fold(Expression::from(0.0), |acc, j| {
                acc + dv.in_session[&(r_idx, j)]
            });
            model = model.with(constraint!(session_sum == 1.0));
        }

        // Window linkage: the chosen window bounds t[r]; unchosen
        // windows are relaxed away by the big-M terms.
        for (r_idx, runner) in runners.iter().enumerate() {
            let occupied = self.occupied_units(runner) as f64;
            let start_ub = horizon_units - occupied;
            let t = dv.start[r_idx];

            for (w_idx, window) in runner.windows.iter().enumerate() {
                let w = dv.in_window[&(r_idx, w_idx)];
                let fr = self.units(window.fr()) as f64;
                let to = self.units(window.to()) as f64;

                model = model.with(constraint!(t - w * start_ub >= fr - start_ub));

                // With overrun allowed, only the pre-end margin (or the
                // whole run, if shorter) must fit before the window
                // closes; the tail may spill past it.
                let tail = if self.settings.allow_overrun {
                    occupied.min(margin_units as f64)
                } else {
                    occupied
                };
                model = model.with(constraint!(
                    t + w * horizon_units <= to - tail + horizon_units
                ));
            }
        }

        // Lane exclusivity: sharing a session forces exactly one
        // precedence direction between the pair.
        for a in 0..runners.len() {
            for b in (a + 1)..runners.len() {
                let z_ab = dv.precedes[&(a, b)];
                let z_ba = dv.precedes[&(b, a)];
                model = model.with(constraint!(z_ab + z_ba <= 1.0));
                for j in 1..=sessions {
                    let s_a = dv.in_session[&(a, j)];
                    let s_b = dv.in_session[&(b, j)];
                    model = model.with(constraint!(z_ab + z_ba >= s_a + s_b - 1.0));
                }
            }
        }

        // Precedence: z[a,b] makes b start after a finishes. The only
        // overlap prevention between lane-mates.
        for (a, runner_a) in runners.iter().enumerate() {
            let occupied_a = self.occupied_units(runner_a) as f64;
            for b in 0..runners.len() {
                if a == b {
                    continue;
                }
                let t_a = dv.start[a];
                let t_b = dv.start[b];
                let z = dv.precedes[&(a, b)];
                model = model.with(constraint!(
                    t_a - t_b + z * horizon_units <= horizon_units - occupied_a
                ));
            }
        }

        model
    }

    /// Reconstructs the runner → (session, window) mapping from solved
    /// variable values.
    fn decode_solution(&self, solution: &impl Solution, dv: &DecisionVars) -> Schedule {
        let mut schedule = Schedule::new();
        for (r_idx, runner) in self.instance.runners.iter().enumerate() {
            for j in 1..=self.settings.max_parallel_sessions {
                if solution.value(dv.in_session[&(r_idx, j)]) > 1.0 - INTEGER_TOLERANCE {
                    let start_units =
                        (solution.value(dv.start[r_idx]) + FEASIBILITY_TOLERANCE).floor() as i64;
                    let fr = self.from_units(start_units);
                    let to = fr + Duration::seconds(runner.occupied_s);
                    schedule.add_assignment(Assignment::new(
                        runner.id,
                        j,
                        TimeWindow::unchecked(fr, to),
                    ));
                    break;
                }
            }
        }
        schedule
    }

    /// Quantized offset of an instant from the horizon start.
    fn units(&self, at: NaiveDateTime) -> i64 {
        (at - self.instance.horizon.fr()).num_seconds() / self.settings.quantum_s
    }

    /// Occupied duration of a runner in quanta.
    fn occupied_units(&self, runner: &Runner) -> i64 {
        runner.occupied_s / self.settings.quantum_s
    }

    /// Instant at a quantized offset from the horizon start.
    fn from_units(&self, units: i64) -> NaiveDateTime {
        self.instance.horizon.fr() + Duration::seconds(units * self.settings.quantum_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::Genre;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn window(fr_day: u32, fr_hour: u32, to_day: u32, to_hour: u32) -> TimeWindow {
        TimeWindow::new(at(fr_day, fr_hour), at(to_day, to_hour)).unwrap()
    }

    /// Runner whose occupied duration comes out to exactly `hours`.
    fn runner_hours(id: u32, hours: i64, windows: Vec<TimeWindow>, s: &SolveSettings) -> Runner {
        let est = hours * 3600 - s.buffer_s;
        Runner::new(id, format!("runner-{id}"), Genre::Action, est, s).with_windows(windows)
    }

    #[test]
    fn test_units_round_trip() {
        let settings = SolveSettings::default();
        let instance = Instance::new(vec![], window(15, 19, 18, 0));
        let builder = ScheduleModelBuilder::new(&instance, &settings);

        assert_eq!(builder.units(at(15, 19)), 0);
        assert_eq!(builder.units(at(15, 20)), 12); // 60 min / 5 min
        assert_eq!(builder.from_units(12), at(15, 20));
        assert_eq!(builder.units(at(18, 0)), 65 * 12);
    }

    #[test]
    fn test_session_weights_decrease_geometrically() {
        let settings = SolveSettings::default().with_sessions(3);
        let instance = Instance::new(vec![], window(15, 19, 18, 0));
        let builder = ScheduleModelBuilder::new(&instance, &settings);

        // Horizon is 780 quanta → 3 digits → base 1000.
        let weights = builder.session_weights();
        assert_eq!(weights, vec![1000.0, 1.0, 0.0]);
    }

    #[test]
    fn test_final_session_is_unweighted() {
        let settings = SolveSettings::default().with_sessions(1);
        let instance = Instance::new(vec![], window(15, 19, 18, 0));
        let builder = ScheduleModelBuilder::new(&instance, &settings);
        assert_eq!(builder.session_weights(), vec![0.0]);
    }

    #[test]
    fn test_disjoint_runners_pack_first_session_back_to_back() {
        let settings = SolveSettings::default().with_overrun(false).with_sessions(2);
        // Each window exactly fits its runner, so the only feasible
        // placement is back-to-back; the objective pulls both runs into
        // session 1.
        let runners = vec![
            runner_hours(1, 2, vec![window(15, 19, 15, 21)], &settings),
            runner_hours(2, 2, vec![window(15, 21, 15, 23)], &settings),
        ];
        let instance = Instance::new(runners, window(15, 19, 16, 0));

        let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
        assert!(status.is_solution_found());

        let a = schedule.assignment_for_runner(1).unwrap();
        let b = schedule.assignment_for_runner(2).unwrap();
        assert_eq!(a.session, 1);
        assert_eq!(b.session, 1);
        assert_eq!(a.window.fr(), at(15, 19));
        assert_eq!(a.window.to(), b.window.fr()); // no gap
        assert_eq!(b.window.to(), at(15, 23));
    }

    #[test]
    fn test_single_session_sequences_three_runners() {
        let settings = SolveSettings::default().with_sessions(1);
        let horizon = window(15, 19, 16, 1);
        let runners = (1..=3)
            .map(|id| runner_hours(id, 1, vec![horizon], &settings))
            .collect();
        let instance = Instance::new(runners, horizon);

        let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
        assert!(status.is_solution_found());
        assert_eq!(schedule.assignment_count(), 3);

        let lane = schedule.assignments_for_session(1);
        assert_eq!(lane.len(), 3);
        for pair in lane.windows(2) {
            assert!(
                !pair[0].window.overlaps(&pair[1].window),
                "lane-mates overlap: {} and {}",
                pair[0].window,
                pair[1].window,
            );
        }
    }

    #[test]
    fn test_no_overrun_keeps_runs_inside_windows() {
        let settings = SolveSettings::default().with_overrun(false).with_sessions(2);
        let windows = vec![window(15, 19, 15, 22), window(16, 9, 16, 15)];
        let runners = vec![
            runner_hours(1, 3, windows.clone(), &settings),
            runner_hours(2, 4, windows.clone(), &settings),
        ];
        let instance = Instance::new(runners, window(15, 19, 17, 0));

        let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
        assert!(status.is_solution_found());
        for assignment in &schedule.assignments {
            assert!(
                windows
                    .iter()
                    .any(|w| w.fr() <= assignment.window.fr() && assignment.window.to() <= w.to()),
                "run {} escapes every eligible window",
                assignment.window,
            );
        }
    }

    #[test]
    fn test_overrun_lets_the_tail_spill_past_the_window() {
        // A two-hour run in a one-hour window only fits when the
        // overrun policy admits it with the one-hour margin.
        let strict = SolveSettings::default().with_overrun(false).with_sessions(1);
        let runners = vec![runner_hours(1, 2, vec![window(15, 19, 15, 20)], &strict)];
        let instance = Instance::new(runners, window(15, 19, 16, 0));
        let (schedule, status) = ScheduleModelBuilder::new(&instance, &strict).solve();
        assert_eq!(status, SolveStatus::Infeasible);
        assert!(schedule.is_empty());

        let relaxed = SolveSettings::default().with_overrun(true).with_sessions(1);
        let runners = vec![runner_hours(1, 2, vec![window(15, 19, 15, 20)], &relaxed)];
        let instance = Instance::new(runners, window(15, 19, 16, 0));
        let (schedule, status) = ScheduleModelBuilder::new(&instance, &relaxed).solve();
        assert!(status.is_solution_found());
        let a = schedule.assignment_for_runner(1).unwrap();
        assert_eq!(a.window.fr(), at(15, 19));
        assert_eq!(a.window.to(), at(15, 21)); // spills one hour past
    }

    #[test]
    fn test_runner_without_windows_is_infeasible() {
        let settings = SolveSettings::default();
        let runners = vec![
            runner_hours(1, 1, vec![window(15, 19, 15, 23)], &settings),
            runner_hours(2, 1, vec![], &settings),
        ];
        let instance = Instance::new(runners, window(15, 19, 16, 0));

        let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
        assert_eq!(status, SolveStatus::Infeasible);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_tiny_budget_never_crashes() {
        let settings = SolveSettings::default().with_time_budget(1).with_sessions(2);
        let horizon = window(15, 19, 18, 0);
        let runners = (1..=6)
            .map(|id| runner_hours(id, 2, vec![horizon], &settings))
            .collect();
        let instance = Instance::new(runners, horizon);

        let (schedule, status) = ScheduleModelBuilder::new(&instance, &settings).solve();
        if status.is_solution_found() {
            assert_eq!(schedule.assignment_count(), 6);
            for j in 1..=2 {
                let lane = schedule.assignments_for_session(j);
                for pair in lane.windows(2) {
                    assert!(!pair[0].window.overlaps(&pair[1].window));
                }
            }
        } else {
            assert!(schedule.is_empty());
        }
    }
}
