//! Top-level simulation configuration.
//!
//! `SimConfig` is a static struct with named fields.  It is validated once,
//! at construction of the simulation ([`SimConfig::validate`] is called by
//! `ps_sim::SimBuilder::build`); no component is built from an invalid
//! configuration.

use crate::geom::Bounds;
use crate::{CoreError, CoreResult};

// ── GrowthModel ───────────────────────────────────────────────────────────────

/// How positional uncertainty grows along a shadow.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrowthModel {
    /// `Σ_k = v_k · I`, the same variance in every direction.  Risk is then
    /// evaluated in closed form.
    #[default]
    Isotropic,
    /// Extra variance along the direction of travel:
    /// `Σ_k = v_k · I + growth · k · (ratio − 1) · u uᵀ`.  Risk falls back to
    /// seeded Monte-Carlo sampling.  `ratio` must be ≥ 1.
    AlongTrack { ratio: f64 },
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Simulation parameters.
///
/// Defaults mirror the reference drone scenario: 20 prediction steps over a
/// 6 s horizon, 1.5 m/s cruise, 4 m safety radius, 0.25 risk threshold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Horizon granularity: number of future steps in every shadow (≥ 1).
    pub prediction_steps: u32,

    /// Variance added per step index (≥ 0).
    pub uncertainty_growth_rate: f64,

    /// Pairwise risk above which an agent must replan, in `[0, 1]`.
    pub collision_threshold: f64,

    /// Radius of the conflict ball used in the overlap probability (> 0).
    pub safe_distance: f64,

    /// Seconds covered by a shadow (> 0).  One tick lasts
    /// `time_horizon / prediction_steps` seconds.
    pub time_horizon: f64,

    /// Pairs whose current positions are further apart than this are never
    /// evaluated (> 0).
    pub mesh_range: f64,

    /// Consecutive failed replans before an agent stalls (≥ 1).
    pub max_replan_attempts: u32,

    /// Ticks a stalled agent waits before it may re-attempt (≥ 0).
    pub reroute_pause: u32,

    /// Cruise speed along the planned path, units per second (> 0).
    pub nominal_speed: f64,

    /// Variance added to every step after step 0 (≥ 0).
    pub base_variance: f64,

    /// Smallest variance ever used; keeps degenerate shadows well-defined (> 0).
    pub covariance_floor: f64,

    /// Distance to goal below which an agent counts as arrived (> 0).
    pub arrival_epsilon: f64,

    pub growth_model: GrowthModel,

    /// Weight of aggregate risk in a candidate's cost, in path-length units (≥ 0).
    pub risk_weight: f64,

    /// Upper bound on alternative paths generated per replan (≥ 1).
    pub max_candidates: usize,

    /// Samples per (pair, step) for the anisotropic Monte-Carlo fallback (≥ 1).
    pub monte_carlo_samples: u32,

    /// Master seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Upper bound on ticks processed by one call to `Simulation::run`.
    /// `None` runs until every agent has arrived or a stop is requested.
    pub max_ticks: Option<u64>,

    /// The space agents may occupy.  Starts and goals must lie inside it and
    /// detour waypoints are clamped into it.  `None` leaves space unbounded.
    pub bounds: Option<Bounds>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            prediction_steps:        20,
            uncertainty_growth_rate: 0.08,
            collision_threshold:     0.25,
            safe_distance:           4.0,
            time_horizon:            6.0,
            mesh_range:              50.0,
            max_replan_attempts:     3,
            reroute_pause:           50,
            nominal_speed:           1.5,
            base_variance:           0.1,
            covariance_floor:        1e-6,
            arrival_epsilon:         0.1,
            growth_model:            GrowthModel::Isotropic,
            risk_weight:             50.0,
            max_candidates:          24,
            monte_carlo_samples:     2048,
            seed:                    42,
            max_ticks:               Some(2_000),
            bounds:                  None,
        }
    }
}

impl SimConfig {
    /// Seconds per tick (and per shadow step).
    #[inline]
    pub fn step_duration(&self) -> f64 {
        self.time_horizon / self.prediction_steps as f64
    }

    /// Distance an agent covers in one tick.
    #[inline]
    pub fn step_distance(&self) -> f64 {
        self.nominal_speed * self.step_duration()
    }

    /// Check every field against its documented range.
    ///
    /// Returns the first violation as [`CoreError::Config`].
    pub fn validate(&self) -> CoreResult<()> {
        if self.prediction_steps < 1 {
            return Err(CoreError::config("prediction_steps must be at least 1"));
        }
        non_negative("uncertainty_growth_rate", self.uncertainty_growth_rate)?;
        if !(0.0..=1.0).contains(&self.collision_threshold) {
            return Err(CoreError::config(format!(
                "collision_threshold must be in [0, 1], got {}",
                self.collision_threshold
            )));
        }
        positive("safe_distance", self.safe_distance)?;
        positive("time_horizon", self.time_horizon)?;
        positive("mesh_range", self.mesh_range)?;
        if self.max_replan_attempts < 1 {
            return Err(CoreError::config("max_replan_attempts must be at least 1"));
        }
        positive("nominal_speed", self.nominal_speed)?;
        non_negative("base_variance", self.base_variance)?;
        positive("covariance_floor", self.covariance_floor)?;
        positive("arrival_epsilon", self.arrival_epsilon)?;
        non_negative("risk_weight", self.risk_weight)?;
        if self.max_candidates < 1 {
            return Err(CoreError::config("max_candidates must be at least 1"));
        }
        if self.monte_carlo_samples < 1 {
            return Err(CoreError::config("monte_carlo_samples must be at least 1"));
        }
        if let GrowthModel::AlongTrack { ratio } = self.growth_model {
            if !ratio.is_finite() || ratio < 1.0 {
                return Err(CoreError::config(format!(
                    "along-track growth ratio must be a finite value >= 1, got {ratio}"
                )));
            }
        }
        if let Some(b) = self.bounds {
            if !b.is_valid() {
                return Err(CoreError::config(format!(
                    "bounds must be finite with min <= max on every axis, got {:?} .. {:?}",
                    b.min.as_slice(),
                    b.max.as_slice()
                )));
            }
        }
        Ok(())
    }
}

fn positive(name: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::config(format!("{name} must be finite and > 0, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::config(format!("{name} must be finite and >= 0, got {v}")))
    }
}
