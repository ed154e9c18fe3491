//! `ps-sim`: tick loop orchestrator for the probability-shadow simulator.
//!
//! # Four-phase tick
//!
//! ```text
//! for each tick:
//!   ① Snapshot:  read-only view of every agent.
//!   ② Shadows:   ShadowGenerator::generate per agent (parallel with the
//!                `parallel` feature); reject any shrinking covariance trace.
//!   ③ Risk map:  R-tree pruning, then pairwise overlap risk (parallel).
//!   ④ Commit:    replan candidates searched from the snapshot (parallel),
//!                then for each agent in ascending AgentId order:
//!                  status transitions, path commits, stalls, movement.
//! ```
//!
//! Phases ①–③ are pure; [`Simulation::risk_map`] runs them without
//! committing anything.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs phases ②–④a on Rayon's thread pool.               |
//! | `serde`    | Derives `Serialize`/`Deserialize` on record types.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ps_core::{AgentId, SimConfig, Vec3};
//! use ps_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default())
//!     .agent(AgentId(0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0))
//!     .agent(AgentId(1), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 10.0, 0.0))
//!     .build()?;
//! let outcome = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod record;
pub mod sim;
pub mod stop;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use record::{AgentState, ReplanEvent, RiskEvent, SimState, StallEvent, TickRecord};
pub use sim::{RunOutcome, Simulation, StopReason};
pub use stop::StopHandle;
