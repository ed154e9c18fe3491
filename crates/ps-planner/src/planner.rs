//! Replan trigger and candidate selection.

use std::cmp::Ordering;

use tracing::debug;

use ps_agent::{Agent, AgentStatus};
use ps_core::geom::path_length;
use ps_core::{AgentId, Bounds, SimConfig, Vec3};
use ps_risk::{NumericWarning, RiskEstimator, RiskMap};
use ps_shadow::{Shadow, ShadowGenerator};

use crate::{CandidateGenerator, DetourFan, PlannerResult, ReplanFailure};

// ── Trigger ───────────────────────────────────────────────────────────────────

/// `true` if `agent` must look for a new path this tick.
///
/// The agent must be eligible (`EnRoute`, `Replanning`, or `Stalled` with its
/// cooldown elapsed) and its highest risk against any agent accepted by
/// `active` must strictly exceed `threshold`.
pub fn needs_replan(
    agent:     &Agent,
    risk_map:  &RiskMap,
    threshold: f64,
    active:    impl Fn(AgentId) -> bool,
) -> bool {
    let eligible = match agent.status {
        AgentStatus::EnRoute | AgentStatus::Replanning => true,
        AgentStatus::Stalled => agent.cooldown == 0,
        AgentStatus::Arrived => false,
    };
    eligible && risk_map.max_for(agent.id, active) > threshold
}

// ── PathCandidate ─────────────────────────────────────────────────────────────

/// A scored alternative path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCandidate {
    /// Waypoints after the current position; the last one is the goal.
    pub path:   Vec<Vec3>,
    pub length: f64,
    /// Highest overlap risk against the obstacle shadows.
    pub risk:   f64,
    /// `length + risk_weight · risk`.
    pub cost:   f64,
    /// Position in the generator's output.
    pub index:  usize,
    /// Degeneracies repaired while scoring this path.
    pub warnings: Vec<NumericWarning>,
}

impl PathCandidate {
    /// Ordering used for selection: cost, then length, then generation order.
    fn rank(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.length.total_cmp(&other.length))
            .then(self.index.cmp(&other.index))
    }
}

// ── ReplanDecision ────────────────────────────────────────────────────────────

/// The outcome of [`PathPlanner::decide`] plus every numeric degeneracy
/// repaired while scoring candidates, whichever candidate won.
#[derive(Debug)]
pub struct ReplanDecision {
    pub outcome:  Result<PathCandidate, ReplanFailure>,
    pub warnings: Vec<NumericWarning>,
}

impl ReplanDecision {
    pub fn is_fatal(&self) -> bool {
        self.outcome.as_ref().err().is_some_and(ReplanFailure::is_fatal)
    }
}

// ── PathPlanner ───────────────────────────────────────────────────────────────

/// Scores generated candidates against a snapshot of other agents' shadows.
///
/// Pure: `replan` reads the agent and the snapshot and returns a decision;
/// committing it is the caller's job.
#[derive(Clone, Debug)]
pub struct PathPlanner<G: CandidateGenerator = DetourFan> {
    generator:      G,
    shadows:        ShadowGenerator,
    risk:           RiskEstimator,
    threshold:      f64,
    risk_weight:    f64,
    max_candidates: usize,
    bounds:         Option<Bounds>,
}

impl PathPlanner<DetourFan> {
    /// Planner with the default [`DetourFan`] generator.
    pub fn from_config(config: &SimConfig) -> PlannerResult<Self> {
        Self::with_generator(config, DetourFan::from_config(config))
    }
}

impl<G: CandidateGenerator> PathPlanner<G> {
    pub fn with_generator(config: &SimConfig, generator: G) -> PlannerResult<Self> {
        Ok(Self {
            generator,
            shadows:        ShadowGenerator::from_config(config)?,
            risk:           RiskEstimator::from_config(config)?,
            threshold:      config.collision_threshold,
            risk_weight:    config.risk_weight,
            max_candidates: config.max_candidates,
            bounds:         config.bounds,
        })
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every candidate path for `agent` against `obstacles`.
    ///
    /// Paths with a waypoint outside the configured bounds are dropped; the
    /// survivors keep their generator index.
    pub fn score_candidates(
        &self,
        agent:     &Agent,
        obstacles: &[&Shadow],
    ) -> Result<Vec<PathCandidate>, ReplanFailure> {
        self.generator
            .candidates(agent, self.max_candidates)
            .into_iter()
            .enumerate()
            .filter(|(_, path)| self.bounds.is_none_or(|b| path.iter().all(|w| b.contains(w))))
            .map(|(index, path)| {
                let shadow = self.shadows.generate_along(agent.id, agent.position, &path, true);
                let mut risk: f64 = 0.0;
                let mut warnings = Vec::new();
                for other in obstacles {
                    let pair = self.risk.estimate(&shadow, other)?;
                    risk = risk.max(pair.score);
                    warnings.extend(pair.warnings);
                }
                let length = path_length(agent.position, &path);
                let cost = length + self.risk_weight * risk;
                Ok(PathCandidate { path, length, risk, cost, index, warnings })
            })
            .collect()
    }

    /// Pick a new path for `agent`.
    ///
    /// `obstacles` are the snapshot shadows of every other non-arrived agent.
    /// The agent's current risk is read from `risk_map`.
    ///
    /// Candidates with `risk ≤ threshold` are viable and the cheapest viable
    /// one wins.  Without a viable candidate, the cheapest one that strictly
    /// lowers the current risk wins.  Otherwise the replan fails with
    /// [`ReplanFailure::NoImprovement`].
    pub fn replan(
        &self,
        agent:     &Agent,
        obstacles: &[&Shadow],
        risk_map:  &RiskMap,
    ) -> Result<PathCandidate, ReplanFailure> {
        self.decide(agent, obstacles, risk_map).outcome
    }

    /// [`replan`](Self::replan), keeping the degeneracy warnings raised while
    /// scoring every candidate.
    pub fn decide(&self, agent: &Agent, obstacles: &[&Shadow], risk_map: &RiskMap) -> ReplanDecision {
        match self.score_candidates(agent, obstacles) {
            Ok(scored) => {
                let warnings = scored.iter().flat_map(|c| c.warnings.iter().copied()).collect();
                ReplanDecision { outcome: self.select(agent, obstacles, risk_map, &scored), warnings }
            }
            Err(failure) => ReplanDecision { outcome: Err(failure), warnings: Vec::new() },
        }
    }

    fn select(
        &self,
        agent:     &Agent,
        obstacles: &[&Shadow],
        risk_map:  &RiskMap,
        scored:    &[PathCandidate],
    ) -> Result<PathCandidate, ReplanFailure> {
        let current = obstacles
            .iter()
            .map(|o| risk_map.get(agent.id, o.agent))
            .fold(0.0, f64::max);

        if scored.is_empty() {
            return Err(ReplanFailure::NoCandidates);
        }

        let viable = scored.iter().filter(|c| c.risk <= self.threshold).min_by(|a, b| a.rank(b));
        let chosen = viable.or_else(|| {
            scored.iter().filter(|c| c.risk < current).min_by(|a, b| a.rank(b))
        });

        match chosen {
            Some(c) => {
                debug!(
                    agent = %agent.id,
                    current,
                    risk = c.risk,
                    cost = c.cost,
                    candidate = c.index,
                    "replan candidate selected"
                );
                Ok(c.clone())
            }
            None => {
                let best = scored.iter().map(|c| c.risk).fold(f64::INFINITY, f64::min);
                Err(ReplanFailure::NoImprovement { current, best })
            }
        }
    }
}
