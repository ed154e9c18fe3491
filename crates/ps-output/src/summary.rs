//! Run-wide statistics accumulated from tick records.

use std::collections::BTreeMap;

use serde::Serialize;

use ps_core::{AgentId, Tick};
use ps_sim::{SimState, TickRecord};

/// Final figures for one agent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentSummary {
    pub agent_id:           u32,
    pub status:             &'static str,
    pub completion_pct:     f64,
    pub distance_travelled: f64,
    pub remaining_distance: f64,
    pub reroute_count:      u32,
    pub stall_count:        u32,
    /// Highest risk this agent saw at any tick.
    pub peak_risk:          f64,
}

/// Aggregate statistics for a whole run.
///
/// Feed it every [`TickRecord`] with [`record_tick`][Self::record_tick] and
/// close it with [`finish`][Self::finish]; [`SimOutputObserver`][crate::SimOutputObserver]
/// does both.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks:            u64,
    pub final_tick:       u64,
    /// Mean over ticks of each tick's mean pair risk.
    pub mean_risk:        f64,
    pub max_risk:         f64,
    pub max_risk_tick:    Option<u64>,
    pub risk_events:      u64,
    pub reroutes:         u64,
    pub stalls:           u64,
    pub arrivals:         u64,
    pub numeric_warnings: u64,
    pub pairs_evaluated:  u64,
    pub pairs_pruned:     u64,
    pub agents:           Vec<AgentSummary>,

    #[serde(skip)]
    risk_sum:  f64,
    #[serde(skip)]
    peak_risk: BTreeMap<AgentId, f64>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self, record: &TickRecord) {
        self.ticks += 1;
        self.risk_sum += record.mean_risk;
        self.mean_risk = self.risk_sum / self.ticks as f64;
        if record.max_risk > self.max_risk || self.max_risk_tick.is_none() {
            self.max_risk = record.max_risk;
            self.max_risk_tick = Some(record.tick.0);
        }

        self.risk_events      += record.risk_events.len() as u64;
        self.reroutes         += record.replan_events.len() as u64;
        self.stalls           += record.stall_events.len() as u64;
        self.arrivals         += record.arrivals.len() as u64;
        self.numeric_warnings += record.warnings.len() as u64;
        self.pairs_evaluated  += record.pairs_evaluated as u64;
        self.pairs_pruned     += record.pairs_pruned as u64;

        for s in &record.agent_states {
            let peak = self.peak_risk.entry(s.id).or_insert(0.0);
            *peak = peak.max(s.max_risk);
        }
    }

    /// Replace the per-agent table with the final state.  May be called more
    /// than once; the last call wins.
    pub fn finish(&mut self, final_tick: Tick, state: &SimState) {
        self.final_tick = final_tick.0;
        self.agents = state
            .agents
            .iter()
            .map(|s| AgentSummary {
                agent_id:           s.id.0,
                status:             s.status.as_str(),
                completion_pct:     s.completion_pct,
                distance_travelled: s.distance_travelled,
                remaining_distance: s.remaining_distance,
                reroute_count:      s.reroute_count,
                stall_count:        s.stall_count,
                peak_risk:          self.peak_risk.get(&s.id).copied().unwrap_or(0.0),
            })
            .collect();
    }

    /// Mean completion percentage over the final agent table.
    pub fn mean_completion_pct(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.agents.iter().map(|a| a.completion_pct).sum::<f64>() / self.agents.len() as f64
    }
}
