//! `ps-shadow`: uncertainty shadows for the probability-shadow simulator.
//!
//! A shadow is an agent's predicted future position expressed as one 3-D
//! Gaussian per step over a fixed horizon.  Means follow the committed path
//! at nominal speed; covariance grows with the step index.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`shadow`]    | `Shadow`, `ShadowStep` value types                      |
//! | [`generator`] | `ShadowGenerator`, the free `generate` helper           |
//! | [`error`]     | `ShadowError`, `ShadowResult`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | `generate_all` runs on Rayon's thread pool.             |
//! | `serde`    | Derives `Serialize`/`Deserialize` on shadow types.      |

pub mod error;
pub mod generator;
pub mod shadow;

#[cfg(test)]
mod tests;

pub use error::{ShadowError, ShadowResult};
pub use generator::{ShadowGenerator, generate};
pub use shadow::{Shadow, ShadowStep};
