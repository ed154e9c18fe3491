//! Planner error type.

use thiserror::Error;

use ps_core::CoreError;
use ps_risk::RiskError;

/// Why [`PathPlanner::replan`][crate::PathPlanner::replan] produced no path.
///
/// `NoCandidates` and `NoImprovement` are ordinary outcomes the caller turns
/// into agent state (a failed attempt).  `Risk` carries an invariant
/// violation from risk estimation and must abort the tick.
#[derive(Debug, Error)]
pub enum ReplanFailure {
    #[error("candidate generator produced no paths")]
    NoCandidates,

    #[error("no candidate improves on current risk {current:.4} (best {best:.4})")]
    NoImprovement { current: f64, best: f64 },

    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl ReplanFailure {
    /// `true` if the failure must abort the tick rather than count as an attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReplanFailure::Risk(_))
    }
}

/// Errors building a planner.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Shadow(#[from] ps_shadow::ShadowError),

    #[error(transparent)]
    Risk(#[from] RiskError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
