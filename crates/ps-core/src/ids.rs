//! Strongly typed, zero-cost identifier wrappers.
//!
//! `AgentId` is `Copy + Ord + Hash` so it can be used as a map key and sorted
//! without ceremony.  Ascending `AgentId` order is the simulation's fixed
//! precedence order: every commit-phase decision is applied in it.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Caller-assigned identifier of an agent.  Unique within a simulation.
    pub struct AgentId(u32);
}

// ── AgentPair ─────────────────────────────────────────────────────────────────

/// An unordered pair of agents, stored canonically as `(lower, higher)`.
///
/// `AgentPair::new(a, b) == AgentPair::new(b, a)` for all `a`, `b`, which is
/// what makes a risk map symmetric by construction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPair {
    lo: AgentId,
    hi: AgentId,
}

impl AgentPair {
    #[inline]
    pub fn new(a: AgentId, b: AgentId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// The member with the lower identifier (the one with precedence).
    #[inline]
    pub fn lo(self) -> AgentId {
        self.lo
    }

    #[inline]
    pub fn hi(self) -> AgentId {
        self.hi
    }

    #[inline]
    pub fn contains(self, agent: AgentId) -> bool {
        self.lo == agent || self.hi == agent
    }

    /// The member that is not `agent`, or `None` if `agent` is not in the pair.
    #[inline]
    pub fn other(self, agent: AgentId) -> Option<AgentId> {
        if self.lo == agent {
            Some(self.hi)
        } else if self.hi == agent {
            Some(self.lo)
        } else {
            None
        }
    }
}

impl fmt::Display for AgentPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo.0, self.hi.0)
    }
}
