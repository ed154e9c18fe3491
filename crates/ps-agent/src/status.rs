//! Agent status: a closed state enum with an explicit transition table.

use std::fmt;

/// Where an agent is in the replanning life cycle.
///
/// ```text
///            risk > threshold                 candidate committed
///   EnRoute ─────────────────▶ Replanning ─────────────────────────▶ EnRoute
///      │                          │  attempts exhausted
///      │                          ▼
///      │                       Stalled ── cooldown elapsed ──▶ EnRoute
///      │ distance to goal < ε
///      ▼
///   Arrived  (terminal)
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentStatus {
    /// Following the committed path.
    #[default]
    EnRoute,
    /// Risk is above threshold; a new path is being searched for.  The agent
    /// keeps following its old path in the meantime.
    Replanning,
    /// Replan attempts exhausted.  The agent holds position until its
    /// cooldown elapses.
    Stalled,
    /// Within `arrival_epsilon` of the goal.  Terminal.
    Arrived,
}

impl AgentStatus {
    /// The transition table.  Self-transitions are always allowed (no-op).
    pub fn can_transition_to(self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (EnRoute, Replanning)
                | (EnRoute, Arrived)
                | (Replanning, EnRoute)
                | (Replanning, Stalled)
                | (Replanning, Arrived)
                | (Stalled, EnRoute)
        )
    }

    /// `true` for every status except `Arrived`.  Only active agents count as
    /// conflict partners when deciding whether to replan.
    #[inline]
    pub fn is_active(self) -> bool {
        !matches!(self, AgentStatus::Arrived)
    }

    /// `true` if the agent advances along its path this tick.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(self, AgentStatus::EnRoute | AgentStatus::Replanning)
    }

    /// Human-readable label, used as a CSV column value.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::EnRoute    => "en_route",
            AgentStatus::Replanning => "replanning",
            AgentStatus::Stalled    => "stalled",
            AgentStatus::Arrived    => "arrived",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
