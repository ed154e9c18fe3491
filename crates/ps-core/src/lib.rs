//! `ps-core`: foundational types for the probability-shadow simulator.
//!
//! This crate is a dependency of every other `ps-*` crate.  It intentionally
//! has no `ps-*` dependencies and minimal external ones (`nalgebra`, `rand`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `AgentPair`                                |
//! | [`geom`]        | `Vec3`, `Cov3`, `Bounds`, polyline `walk`, `path_length` |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `SampleRng` (per pair/step), `SimRng` (scenario)      |
//! | [`config`]      | `SimConfig`, `GrowthModel`                            |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geom;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{GrowthModel, SimConfig};
pub use error::{CoreError, CoreResult};
pub use geom::{Bounds, Cov3, Vec3, WalkPoint};
pub use ids::{AgentId, AgentPair};
pub use rng::{SampleRng, SimRng};
pub use time::{SimClock, Tick};
