//! Schedule (solution) model.
//!
//! A schedule maps each runner to exactly one session lane and one
//! concrete time window whose length equals the runner's occupied
//! duration. An empty schedule means no solution was produced.

use serde::{Deserialize, Serialize};

use crate::models::TimeWindow;

/// A complete schedule: one entry per assigned runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Runner assignments (runner → session × time window).
    pub assignments: Vec<Assignment>,
}

/// A runner-session-time assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned runner id.
    pub runner_id: u32,
    /// Session lane index, 1-based.
    pub session: usize,
    /// Concrete time window; its length equals the runner's occupied
    /// duration.
    pub window: TimeWindow,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(runner_id: u32, session: usize, window: TimeWindow) -> Self {
        Self {
            runner_id,
            session,
            window,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Whether no runner was assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Finds the assignment for a given runner.
    pub fn assignment_for_runner(&self, runner_id: u32) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.runner_id == runner_id)
    }

    /// Returns all assignments in a given session, in start order.
    pub fn assignments_for_session(&self, session: usize) -> Vec<&Assignment> {
        let mut in_session: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.session == session)
            .collect();
        in_session.sort_by_key(|a| a.window);
        in_session
    }

    /// Latest end instant across all assignments.
    pub fn makespan(&self) -> Option<chrono::NaiveDateTime> {
        self.assignments.iter().map(|a| a.window.to()).max()
    }
}
