//! `ShadowGenerator`: turns an agent's planned path into an uncertainty shadow.
//!
//! # Model
//!
//! For every step `k ∈ [0, horizon]`:
//!
//! - **mean**: the point reached after travelling `k · step_duration ·
//!   nominal_speed` along `[position, path…]`, clamped at the path end;
//! - **covariance** (isotropic, the default):
//!
//!   ```text
//!   v_0 = floor
//!   v_k = max(floor, base_variance + growth_rate · k)      k ≥ 1
//!   Σ_k = v_k · I
//!   ```
//!
//! - with [`GrowthModel::AlongTrack`] an extra `growth_rate · k · (ratio − 1)
//!   · u uᵀ` term stretches the ellipsoid along the direction of travel `u`.
//!   Once the walker stops at the end of its path the last heading is kept,
//!   so the trace stays non-decreasing.
//!
//! Agents that are not moving (stalled, arrived) or have no path left get a
//! degenerate shadow: every step at the current position with `floor · I`.

use ps_agent::Agent;
use ps_core::geom::walk;
use ps_core::{AgentId, Cov3, GrowthModel, SimConfig, Vec3};

use crate::{Shadow, ShadowError, ShadowResult, ShadowStep};

/// Validated shadow parameters.  Cheap to copy; shared read-only across
/// worker threads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowGenerator {
    horizon_steps: u32,
    step_duration: f64,
    growth_rate:   f64,
    base_variance: f64,
    floor:         f64,
    speed:         f64,
    growth_model:  GrowthModel,
}

impl ShadowGenerator {
    /// Build a generator from the three horizon parameters; the remaining
    /// parameters take their [`SimConfig::default`] values.
    ///
    /// Fails if `growth_rate < 0`, `horizon_steps < 1`, or `step_duration` is
    /// not a positive finite number.
    pub fn new(horizon_steps: u32, step_duration: f64, growth_rate: f64) -> ShadowResult<Self> {
        let d = SimConfig::default();
        let generator = Self {
            horizon_steps,
            step_duration,
            growth_rate,
            base_variance: d.base_variance,
            floor:         d.covariance_floor,
            speed:         d.nominal_speed,
            growth_model:  d.growth_model,
        };
        generator.validate()?;
        Ok(generator)
    }

    /// Build a generator from a full simulation configuration.
    pub fn from_config(config: &SimConfig) -> ShadowResult<Self> {
        config.validate()?;
        let generator = Self {
            horizon_steps: config.prediction_steps,
            step_duration: config.step_duration(),
            growth_rate:   config.uncertainty_growth_rate,
            base_variance: config.base_variance,
            floor:         config.covariance_floor,
            speed:         config.nominal_speed,
            growth_model:  config.growth_model,
        };
        generator.validate()?;
        Ok(generator)
    }

    fn validate(&self) -> ShadowResult<()> {
        if self.horizon_steps < 1 {
            return Err(ShadowError::Config("horizon_steps must be at least 1".into()));
        }
        if !(self.growth_rate.is_finite() && self.growth_rate >= 0.0) {
            return Err(ShadowError::Config(format!(
                "growth_rate must be finite and >= 0, got {}",
                self.growth_rate
            )));
        }
        if !(self.step_duration.is_finite() && self.step_duration > 0.0) {
            return Err(ShadowError::Config(format!(
                "step_duration must be finite and > 0, got {}",
                self.step_duration
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn horizon_steps(&self) -> u32 {
        self.horizon_steps
    }

    #[inline]
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Shadow for `agent` along its committed path.
    pub fn generate(&self, agent: &Agent) -> Shadow {
        let moving = agent.status.is_moving() && !agent.path.is_empty();
        self.generate_along(agent.id, agent.position, &agent.path, moving)
    }

    /// Shadow for a hypothetical path starting at `position`.
    ///
    /// Used by the planner to score candidate paths without touching the
    /// agent itself.  `moving = false` yields the degenerate static shadow.
    pub fn generate_along(
        &self,
        agent:    AgentId,
        position: Vec3,
        path:     &[Vec3],
        moving:   bool,
    ) -> Shadow {
        let n = self.horizon_steps as usize + 1;
        let mut steps = Vec::with_capacity(n);

        if !moving || path.is_empty() {
            let cov = Cov3::identity() * self.floor;
            for k in 0..=self.horizon_steps {
                steps.push(ShadowStep { step: k, mean: position, covariance: cov });
            }
            return Shadow { agent, steps, degenerate: true };
        }

        let step_distance = self.speed * self.step_duration;
        let mut last_heading: Option<Vec3> = None;

        for k in 0..=self.horizon_steps {
            let point = walk(position, path, step_distance * k as f64);
            if point.heading.is_some() {
                last_heading = point.heading;
            }
            let covariance = self.covariance_at(k, last_heading);
            steps.push(ShadowStep { step: k, mean: point.position, covariance });
        }

        Shadow { agent, steps, degenerate: false }
    }

    fn covariance_at(&self, k: u32, heading: Option<Vec3>) -> Cov3 {
        if k == 0 {
            return Cov3::identity() * self.floor;
        }
        let grown = self.growth_rate * k as f64;
        let v = (self.base_variance + grown).max(self.floor);
        let mut cov = Cov3::identity() * v;
        if let (GrowthModel::AlongTrack { ratio }, Some(u)) = (self.growth_model, heading) {
            cov += u * u.transpose() * (grown * (ratio - 1.0));
        }
        cov
    }

    /// One shadow per agent, in the order given.
    ///
    /// With the `parallel` feature, generation runs on Rayon's thread pool;
    /// the output order is identical either way.
    pub fn generate_all(&self, agents: &[&Agent]) -> Vec<Shadow> {
        #[cfg(not(feature = "parallel"))]
        {
            agents.iter().map(|a| self.generate(a)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            agents.par_iter().map(|a| self.generate(a)).collect()
        }
    }
}

/// Convenience wrapper: validate the horizon parameters and generate in one
/// call, with every other parameter at its default.
pub fn generate(
    agent:         &Agent,
    horizon_steps: u32,
    step_duration: f64,
    growth_rate:   f64,
) -> ShadowResult<Shadow> {
    Ok(ShadowGenerator::new(horizon_steps, step_duration, growth_rate)?.generate(agent))
}
