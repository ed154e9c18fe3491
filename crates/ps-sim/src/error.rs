use thiserror::Error;

use ps_core::{AgentId, CoreError};
use ps_planner::PlannerError;
use ps_risk::RiskError;
use ps_shadow::ShadowError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} already exists")]
    DuplicateAgent(AgentId),

    #[error("agent {agent}: {what} is not a finite position")]
    InvalidPosition { agent: AgentId, what: &'static str },

    #[error("agent {agent}: {what} lies outside the configured bounds")]
    OutOfBounds { agent: AgentId, what: &'static str },

    /// A tick-level consistency check failed.  The tick is aborted; agent
    /// state and the clock are left as they were before the tick.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("simulation has been terminated")]
    Terminated,

    #[error(transparent)]
    Shadow(#[from] ShadowError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error(transparent)]
    Planner(#[from] PlannerError),
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Config(msg)         => SimError::Config(msg),
            CoreError::AgentNotFound(id)   => SimError::AgentNotFound(id),
            CoreError::DuplicateAgent(id)  => SimError::DuplicateAgent(id),
            CoreError::Invariant(msg)      => SimError::Invariant(msg),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
