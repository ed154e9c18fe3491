//! The `Shadow` value type.

use ps_core::{AgentId, Cov3, Vec3};

/// Belief about an agent's position at one future step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowStep {
    /// Future-step index `k`; the belief for `k · step_duration` seconds ahead.
    pub step: u32,
    pub mean: Vec3,
    pub covariance: Cov3,
}

/// An agent's uncertainty shadow: one [`ShadowStep`] per `k ∈ [0, horizon]`.
///
/// Shadows are recomputed from scratch every tick and never mutated after
/// construction.  Step 0 is always the agent's authoritative position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shadow {
    pub agent: AgentId,
    pub steps: Vec<ShadowStep>,
    /// `true` for static, floor-covariance shadows (stalled/arrived agents).
    pub degenerate: bool,
}

impl Shadow {
    /// Mean at step 0: the agent's current position.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.steps.first().map(|s| s.mean).unwrap_or_else(Vec3::zeros)
    }

    /// Number of steps (`horizon + 1`).
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Covariance trace per step, in step order.
    pub fn traces(&self) -> impl Iterator<Item = f64> + '_ {
        self.steps.iter().map(|s| s.covariance.trace())
    }

    /// Radius of a sphere around [`origin`](Self::origin) that contains every
    /// step's mean plus three standard deviations.
    ///
    /// `√trace(Σ)` bounds the largest per-axis standard deviation from above,
    /// so the sphere is conservative for anisotropic covariances too.
    pub fn extent(&self) -> f64 {
        let origin = self.origin();
        self.steps
            .iter()
            .map(|s| (s.mean - origin).norm() + 3.0 * s.covariance.trace().max(0.0).sqrt())
            .fold(0.0, f64::max)
    }

    /// First step whose covariance trace is smaller than its predecessor's,
    /// or `None` if uncertainty never shrinks along the shadow.
    pub fn first_shrinking_step(&self) -> Option<u32> {
        self.steps.windows(2).find_map(|w| {
            let (prev, next) = (w[0].covariance.trace(), w[1].covariance.trace());
            // Relative tolerance absorbs rounding in the along-track outer product.
            let shrinks = next.is_nan() || next < prev - 1e-12 * prev.abs().max(1.0);
            shrinks.then_some(w[1].step)
        })
    }
}
