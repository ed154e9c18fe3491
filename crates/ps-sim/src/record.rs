//! Per-tick output records.
//!
//! Everything here is an owned, read-only copy; observers can keep records
//! without borrowing the simulation.

use ps_agent::{Agent, AgentStatus};
use ps_core::{AgentId, AgentPair, Tick, Vec3};
use ps_risk::NumericWarning;

/// Snapshot of one agent after a tick's commit phase.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub id:                 AgentId,
    pub position:           Vec3,
    pub goal:               Vec3,
    pub status:             AgentStatus,
    pub replan_attempts:    u32,
    pub cooldown:           u32,
    /// Highest risk against any active agent at this tick.
    pub max_risk:           f64,
    pub distance_travelled: f64,
    pub remaining_distance: f64,
    pub completion_pct:     f64,
    pub reroute_count:      u32,
    pub stall_count:        u32,
}

impl AgentState {
    pub fn capture(agent: &Agent) -> Self {
        Self {
            id:                 agent.id,
            position:           agent.position,
            goal:               agent.goal,
            status:             agent.status,
            replan_attempts:    agent.replan_attempts,
            cooldown:           agent.cooldown,
            max_risk:           agent.last_risk,
            distance_travelled: agent.distance_travelled,
            remaining_distance: agent.remaining_distance(),
            completion_pct:     agent.completion_pct(),
            reroute_count:      agent.reroute_count,
            stall_count:        agent.stall_count,
        }
    }
}

/// A pair whose risk exceeded the collision threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskEvent {
    pub pair:  AgentPair,
    pub score: f64,
}

/// An agent that exhausted its replan attempts this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StallEvent {
    pub agent:    AgentId,
    pub risk:     f64,
    /// Ticks the agent will hold position.
    pub cooldown: u32,
}

/// An agent that committed a new path this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplanEvent {
    pub agent:       AgentId,
    pub risk_before: f64,
    /// Risk of the committed candidate against the snapshot.
    pub risk_after:  f64,
    pub path_length: f64,
    pub cost:        f64,
}

/// Everything that happened in one tick.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRecord {
    pub tick:            Tick,
    /// One entry per agent, ascending id.
    pub agent_states:    Vec<AgentState>,
    pub risk_events:     Vec<RiskEvent>,
    pub stall_events:    Vec<StallEvent>,
    pub replan_events:   Vec<ReplanEvent>,
    /// Agents that reached their goal this tick.
    pub arrivals:        Vec<AgentId>,
    /// Degeneracies repaired while building the risk map, then while scoring
    /// replan candidates.
    pub warnings:        Vec<NumericWarning>,
    pub mean_risk:       f64,
    pub max_risk:        f64,
    pub pairs_evaluated: usize,
    pub pairs_pruned:    usize,
}

impl TickRecord {
    pub fn agent(&self, id: AgentId) -> Option<&AgentState> {
        self.agent_states.iter().find(|s| s.id == id)
    }

    pub fn replanned(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.replan_events.iter().map(|e| e.agent)
    }

    pub fn stalled(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.stall_events.iter().map(|e| e.agent)
    }
}

/// Read-only view of the whole simulation, as returned by `get_state`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimState {
    /// The next tick to be processed.
    pub tick:   Tick,
    pub agents: Vec<AgentState>,
}

impl SimState {
    pub fn agent(&self, id: AgentId) -> Option<&AgentState> {
        self.agents.iter().find(|s| s.id == id)
    }

    pub fn all_arrived(&self) -> bool {
        self.agents.iter().all(|a| a.status == AgentStatus::Arrived)
    }
}
