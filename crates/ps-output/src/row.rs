//! Plain data row types written by output backends.

use ps_sim::{AgentState, RiskEvent, TickRecord};

/// One agent's state after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentStateRow {
    pub tick:               u64,
    pub agent_id:           u32,
    pub x:                  f64,
    pub y:                  f64,
    pub z:                  f64,
    /// `en_route`, `replanning`, `stalled` or `arrived`.
    pub status:             &'static str,
    pub replan_attempts:    u32,
    pub cooldown:           u32,
    pub max_risk:           f64,
    pub distance_travelled: f64,
    pub completion_pct:     f64,
    pub reroute_count:      u32,
    pub stall_count:        u32,
}

impl AgentStateRow {
    pub fn new(tick: u64, s: &AgentState) -> Self {
        Self {
            tick,
            agent_id:           s.id.0,
            x:                  s.position.x,
            y:                  s.position.y,
            z:                  s.position.z,
            status:             s.status.as_str(),
            replan_attempts:    s.replan_attempts,
            cooldown:           s.cooldown,
            max_risk:           s.max_risk,
            distance_travelled: s.distance_travelled,
            completion_pct:     s.completion_pct,
            reroute_count:      s.reroute_count,
            stall_count:        s.stall_count,
        }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    /// Simulated seconds at the start of the tick.
    pub elapsed_secs:    f64,
    pub active_agents:   u32,
    pub mean_risk:       f64,
    pub max_risk:        f64,
    pub risk_events:     u32,
    pub replans:         u32,
    pub stalls:          u32,
    pub arrivals:        u32,
    pub warnings:        u32,
    pub pairs_evaluated: u64,
    pub pairs_pruned:    u64,
}

impl TickSummaryRow {
    pub fn new(record: &TickRecord, elapsed_secs: f64) -> Self {
        Self {
            tick:            record.tick.0,
            elapsed_secs,
            active_agents:   record.agent_states.iter().filter(|s| s.status.is_active()).count() as u32,
            mean_risk:       record.mean_risk,
            max_risk:        record.max_risk,
            risk_events:     record.risk_events.len() as u32,
            replans:         record.replan_events.len() as u32,
            stalls:          record.stall_events.len() as u32,
            arrivals:        record.arrivals.len() as u32,
            warnings:        record.warnings.len() as u32,
            pairs_evaluated: record.pairs_evaluated as u64,
            pairs_pruned:    record.pairs_pruned as u64,
        }
    }
}

/// A pair above the collision threshold at one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskEventRow {
    pub tick:    u64,
    pub agent_a: u32,
    pub agent_b: u32,
    pub score:   f64,
}

impl RiskEventRow {
    pub fn new(tick: u64, e: &RiskEvent) -> Self {
        Self { tick, agent_a: e.pair.lo().0, agent_b: e.pair.hi().0, score: e.score }
    }
}
