//! The `Agent` record.

use ps_core::geom::{self, path_length};
use ps_core::{AgentId, CoreError, CoreResult, Vec3};

use crate::AgentStatus;

/// One simulated agent.
///
/// Owned by the simulation; only the commit phase of a tick mutates it.
/// All fields are `pub` for read access by planners and output writers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,

    /// Authoritative current position.
    pub position: Vec3,

    /// Final destination.  Never changes after initialisation; reroutes only
    /// insert detour waypoints in front of it.
    pub goal: Vec3,

    /// Position at initialisation (for completion percentage).
    pub start: Vec3,

    /// Waypoints still ahead, in order.  The last one is `goal` unless the
    /// agent has arrived, in which case the path is empty.
    pub path: Vec<Vec3>,

    pub status: AgentStatus,

    /// Consecutive failed replan attempts since the last success or stall.
    pub replan_attempts: u32,

    /// Ticks left before a stalled agent may re-attempt.
    pub cooldown: u32,

    /// Distance covered since initialisation.
    pub distance_travelled: f64,

    /// Number of committed reroutes.
    pub reroute_count: u32,

    /// Number of times the agent has stalled.
    pub stall_count: u32,

    /// Maximum pairwise risk observed for this agent at the last tick.
    pub last_risk: f64,
}

impl Agent {
    /// Create an agent heading straight for `goal`.
    ///
    /// An agent whose start is within `arrival_epsilon` of its goal is
    /// `Arrived` from the outset and never enters `Replanning`.
    pub fn new(id: AgentId, start: Vec3, goal: Vec3, arrival_epsilon: f64) -> Self {
        let arrived = (goal - start).norm() < arrival_epsilon;
        Self {
            id,
            position:           start,
            goal,
            start,
            path:               if arrived { Vec::new() } else { vec![goal] },
            status:             if arrived { AgentStatus::Arrived } else { AgentStatus::EnRoute },
            replan_attempts:    0,
            cooldown:           0,
            distance_travelled: 0.0,
            reroute_count:      0,
            stall_count:        0,
            last_risk:          0.0,
        }
    }

    /// Move to `next`, enforcing the [`AgentStatus`] transition table.
    ///
    /// An illegal transition is a programming defect and is reported as
    /// [`CoreError::Invariant`].
    pub fn transition(&mut self, next: AgentStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::Invariant(format!(
                "{}: illegal status transition {} -> {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Length of the remaining planned path.
    pub fn remaining_distance(&self) -> f64 {
        path_length(self.position, &self.path)
    }

    /// Straight-line progress towards the goal, in percent.
    pub fn completion_pct(&self) -> f64 {
        let total = (self.goal - self.start).norm();
        if total <= f64::EPSILON {
            return 100.0;
        }
        let left = (self.goal - self.position).norm();
        (100.0 * (1.0 - left / total)).clamp(0.0, 100.0)
    }

    /// Replace the planned path with `path` (which must end at the goal).
    pub fn commit_path(&mut self, path: Vec<Vec3>) {
        self.path = path;
        self.reroute_count += 1;
        self.replan_attempts = 0;
    }

    /// Advance `distance` along the planned path.
    ///
    /// Reached waypoints are dropped.  Returns `Ok(true)` if the agent came
    /// within `arrival_epsilon` of its goal, in which case it snaps onto the
    /// goal and becomes `Arrived`.
    pub fn advance(&mut self, distance: f64, arrival_epsilon: f64) -> CoreResult<bool> {
        if !self.status.is_moving() {
            return Ok(false);
        }
        let walked = geom::walk(self.position, &self.path, distance);
        self.distance_travelled += (walked.position - self.position).norm();
        self.position = walked.position;
        self.path.drain(..walked.consumed);

        if (self.goal - self.position).norm() < arrival_epsilon {
            self.position = self.goal;
            self.path.clear();
            self.transition(AgentStatus::Arrived)?;
            return Ok(true);
        }
        if self.path.is_empty() {
            // Path ran out short of the goal (only possible if a caller
            // committed a path that does not end at it).  Head for the goal.
            self.path.push(self.goal);
        }
        Ok(false)
    }
}
