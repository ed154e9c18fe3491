//! `ps-agent`: agent records and storage for the probability-shadow simulator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`agent`]    | `Agent`: position, goal, planned path, counters          |
//! | [`status`]   | `AgentStatus` state enum and its transition table         |
//! | [`store`]    | `AgentStore`: id-ordered owning storage                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.     |

pub mod agent;
pub mod status;
pub mod store;

#[cfg(test)]
mod tests;

pub use agent::Agent;
pub use status::AgentStatus;
pub use store::AgentStore;
