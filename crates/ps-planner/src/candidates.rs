//! Candidate path generation.
//!
//! # Pluggability
//!
//! The planner asks a [`CandidateGenerator`] for alternative paths and scores
//! them itself, so search strategies can be swapped without touching cost or
//! selection rules.  The default [`DetourFan`] spreads single-waypoint
//! detours around the goal bearing.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use ps_agent::Agent;
use ps_core::geom::rotate_z;
use ps_core::{Bounds, SimConfig, Vec3};

/// Pluggable candidate search.
///
/// Implementations must be `Send + Sync` so one generator can serve every
/// agent's replan on Rayon worker threads.
pub trait CandidateGenerator: Send + Sync {
    /// Alternative paths for `agent`, in preference order, at most `limit`.
    ///
    /// Every path must end at `agent.goal` and must not contain the agent's
    /// current position as its first waypoint.
    fn candidates(&self, agent: &Agent, limit: usize) -> Vec<Vec<Vec3>>;
}

// ── DetourFan ─────────────────────────────────────────────────────────────────

/// Fan of one-waypoint detours.
///
/// Generation order:
///
/// 1. the direct path `[goal]`;
/// 2. for each radius, `headings` detours spread evenly over `[−π/2, π/2]`
///    around the horizontal goal bearing;
/// 3. for each radius, a climb and a descend detour pitched `±π/4` from the
///    bearing.
///
/// Each detour path is `[position + r · direction, goal]`, with the detour
/// waypoint clamped into `bounds` when set.
#[derive(Clone, Debug, PartialEq)]
pub struct DetourFan {
    pub radii:    Vec<f64>,
    pub headings: usize,
    pub vertical: bool,
    pub bounds:   Option<Bounds>,
}

impl DetourFan {
    /// Radii `{1.5, 3} · safe_distance`, nine headings, vertical detours on,
    /// unbounded.
    pub fn new(safe_distance: f64) -> Self {
        Self {
            radii:    vec![1.5 * safe_distance, 3.0 * safe_distance],
            headings: 9,
            vertical: true,
            bounds:   None,
        }
    }

    /// [`DetourFan::new`] confined to `config.bounds`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self { bounds: config.bounds, ..Self::new(config.safe_distance) }
    }

    /// `None` when clamping pins the waypoint onto the agent itself.
    fn detour(&self, agent: &Agent, dir: Vec3, r: f64) -> Option<Vec<Vec3>> {
        let waypoint = agent.position + dir * r;
        let waypoint = match self.bounds {
            Some(b) => b.clamp(waypoint),
            None => waypoint,
        };
        ((waypoint - agent.position).norm() > r * 1e-9).then(|| vec![waypoint, agent.goal])
    }
}

impl CandidateGenerator for DetourFan {
    fn candidates(&self, agent: &Agent, limit: usize) -> Vec<Vec<Vec3>> {
        let to_goal = agent.goal - agent.position;
        let flat = Vec3::new(to_goal.x, to_goal.y, 0.0);
        // Goal straight above or below: any horizontal bearing will do.
        let bearing = flat.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::x);

        let mut paths = vec![vec![agent.goal]];
        for &r in &self.radii {
            for i in 0..self.headings {
                let theta = if self.headings > 1 {
                    -FRAC_PI_2 + i as f64 * (2.0 * FRAC_PI_2) / (self.headings - 1) as f64
                } else {
                    0.0
                };
                paths.extend(self.detour(agent, rotate_z(bearing, theta), r));
            }
        }
        if self.vertical {
            for &r in &self.radii {
                for pitch in [FRAC_PI_4, -FRAC_PI_4] {
                    let dir = bearing * pitch.cos() + Vec3::z() * pitch.sin();
                    paths.extend(self.detour(agent, dir, r));
                }
            }
        }
        paths.truncate(limit);
        paths
    }
}
