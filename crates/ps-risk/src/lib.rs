//! `ps-risk`: pairwise collision risk between uncertainty shadows.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`estimate`]  | `RiskEstimator`, closed-form and Monte-Carlo overlap    |
//! | [`prune`]     | R-tree pair pruning (`partition_pairs`)                 |
//! | [`build`]     | `RiskEstimator::build_risk_map`                         |
//! | [`map`]       | `RiskMap`, `NumericWarning`, `Degeneracy`               |
//! | [`error`]     | `RiskError`, `RiskResult`                               |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Pair evaluation runs on Rayon's thread pool.            |
//! | `serde`    | Derives `Serialize`/`Deserialize` on warning types.     |

pub mod build;
pub mod error;
pub mod estimate;
pub mod map;
pub mod prune;


pub use build::build_risk_map;
pub use error::{RiskError, RiskResult};
pub use estimate::{PairRisk, RiskEstimator, ball_probability_isotropic, estimate_risk, std_normal_cdf};
pub use map::{Degeneracy, NumericWarning, RiskMap};
pub use prune::{PairPartition, partition_pairs};
