//! `ps-planner`: deciding when an agent must reroute and where to.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`planner`]    | `needs_replan`, `PathPlanner`, `PathCandidate`, `ReplanDecision` |
//! | [`candidates`] | `CandidateGenerator` trait, `DetourFan`                |
//! | [`error`]      | `ReplanFailure`, `PlannerError`                        |
//!
//! Inter-agent precedence (lower id commits first) and the agent state
//! machine are applied by `ps-sim` when it commits planner decisions.

pub mod candidates;
pub mod error;
pub mod planner;

#[cfg(test)]
mod tests;

pub use candidates::{CandidateGenerator, DetourFan};
pub use error::{PlannerError, PlannerResult, ReplanFailure};
pub use planner::{PathCandidate, PathPlanner, ReplanDecision, needs_replan};
