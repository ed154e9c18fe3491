//! `AgentStore`: all agents, keyed and iterated by ascending `AgentId`.
//!
//! # Why a `BTreeMap`?
//!
//! Agents are added and removed by the driver between ticks with arbitrary
//! caller-chosen identifiers, and every commit-phase loop must visit them in
//! ascending id order.  An ordered map gives both without a separate sort
//! per tick; the hot per-tick work happens on the shadow vector built from
//! this store, not on the store itself.

use std::collections::BTreeMap;

use ps_core::{AgentId, CoreError, CoreResult};

use crate::Agent;

/// Owning storage for every agent in a simulation.
#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `agent`.  Fails with [`CoreError::DuplicateAgent`] if its id is
    /// already present; the existing agent is left untouched.
    pub fn insert(&mut self, agent: Agent) -> CoreResult<()> {
        if self.agents.contains_key(&agent.id) {
            return Err(CoreError::DuplicateAgent(agent.id));
        }
        self.agents.insert(agent.id, agent);
        Ok(())
    }

    /// Remove and return the agent with `id`.
    pub fn remove(&mut self, id: AgentId) -> CoreResult<Agent> {
        self.agents.remove(&id).ok_or(CoreError::AgentNotFound(id))
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Mutable access.  Only call this during the commit phase.
    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Iterator over all agents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Iterator over all ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// `true` if there is no agent left that has not arrived.
    pub fn all_arrived(&self) -> bool {
        self.agents.values().all(|a| !a.status.is_active())
    }
}
