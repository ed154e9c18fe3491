//! Per-pair overlap probability between two shadows.
//!
//! For every step both shadows share, the difference `X = A − B` of the two
//! Gaussian beliefs is itself Gaussian with mean `μ = m_A − m_B` and
//! covariance `Σ = Σ_A + Σ_B`.  The step's contribution is
//! `P(‖X‖ ≤ safe_distance)`; the pair's score is the maximum over steps.
//!
//! - Isotropic `Σ = σ² I`: closed-form non-central χ² (3 dof) CDF.
//! - Anything else: seeded Monte-Carlo through a Cholesky factor.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use nalgebra::Cholesky;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::warn;

use ps_core::{AgentPair, Cov3, SampleRng, SimConfig, Vec3};
use ps_shadow::Shadow;

use crate::{Degeneracy, NumericWarning, RiskError, RiskResult};

/// Relative tolerance for treating a covariance as `σ² I`.
const ISOTROPY_TOLERANCE: f64 = 1e-9;

/// Below `d / σ` of this the closed form cancels badly; use the `d → 0` limit.
const CENTRAL_LIMIT_RATIO: f64 = 1e-6;

// ── Closed form ───────────────────────────────────────────────────────────────

/// Standard normal CDF.
#[inline]
pub fn std_normal_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x * FRAC_1_SQRT_2)
}

/// `P(‖X‖ ≤ r)` for `X ~ N(μ, σ² I₃)` with `‖μ‖ = d`.
///
/// ```text
/// P = Φ((r−d)/σ) + Φ((r+d)/σ) − 1
///     + σ / (d √(2π)) · (exp(−(r+d)²/2σ²) − exp(−(r−d)²/2σ²))
/// ```
///
/// For `d → 0` this tends to the Maxwell CDF
/// `2Φ(r/σ) − 1 − √(2/π) (r/σ) exp(−r²/2σ²)`.
pub fn ball_probability_isotropic(d: f64, sigma: f64, r: f64) -> f64 {
    let p = if d <= CENTRAL_LIMIT_RATIO * sigma {
        let x = r / sigma;
        2.0 * std_normal_cdf(x) - 1.0 - (2.0 / PI).sqrt() * x * (-0.5 * x * x).exp()
    } else {
        let two_var = 2.0 * sigma * sigma;
        std_normal_cdf((r - d) / sigma) + std_normal_cdf((r + d) / sigma) - 1.0
            + sigma / (d * (2.0 * PI).sqrt())
                * ((-(r + d).powi(2) / two_var).exp() - (-(r - d).powi(2) / two_var).exp())
    };
    p.clamp(0.0, 1.0)
}

/// `σ²` if `cov` is isotropic within [`ISOTROPY_TOLERANCE`], else `None`.
fn isotropic_variance(cov: &Cov3) -> Option<f64> {
    let diag = cov.diagonal();
    let max = diag.max();
    let min = diag.min();
    let scale = max.abs().max(f64::MIN_POSITIVE);
    let off = [cov[(0, 1)], cov[(0, 2)], cov[(1, 2)], cov[(1, 0)], cov[(2, 0)], cov[(2, 1)]];
    let isotropic = (max - min) <= ISOTROPY_TOLERANCE * scale
        && off.iter().all(|v| v.abs() <= ISOTROPY_TOLERANCE * scale);
    isotropic.then(|| diag.sum() / 3.0)
}

// ── Estimator ─────────────────────────────────────────────────────────────────

/// Score and repaired degeneracies for one pair.
#[derive(Clone, Debug, PartialEq)]
pub struct PairRisk {
    pub pair:      AgentPair,
    pub score:     f64,
    /// Step of the maximum contribution.
    pub peak_step: u32,
    pub warnings:  Vec<NumericWarning>,
}

/// Validated risk parameters.  Shared read-only by every pair evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RiskEstimator {
    pub(crate) safe_distance: f64,
    pub(crate) mesh_range:    f64,
    floor:                    f64,
    samples:                  u32,
    seed:                     u64,
}

impl RiskEstimator {
    /// Estimator with the given radii; floor, sample count and seed take
    /// their [`SimConfig::default`] values.
    pub fn new(safe_distance: f64, mesh_range: f64) -> RiskResult<Self> {
        let d = SimConfig::default();
        let estimator = Self {
            safe_distance,
            mesh_range,
            floor:   d.covariance_floor,
            samples: d.monte_carlo_samples,
            seed:    d.seed,
        };
        estimator.validate()?;
        Ok(estimator)
    }

    pub fn from_config(config: &SimConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self {
            safe_distance: config.safe_distance,
            mesh_range:    config.mesh_range,
            floor:         config.covariance_floor,
            samples:       config.monte_carlo_samples,
            seed:          config.seed,
        })
    }

    fn validate(&self) -> RiskResult<()> {
        for (name, v) in [("safe_distance", self.safe_distance), ("mesh_range", self.mesh_range)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(RiskError::Config(format!("{name} must be finite and > 0, got {v}")));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn safe_distance(&self) -> f64 {
        self.safe_distance
    }

    #[inline]
    pub fn mesh_range(&self) -> f64 {
        self.mesh_range
    }

    /// Overlap risk between two shadows, in `[0, 1]`.
    ///
    /// The pair is canonicalised (lower agent id first) before any arithmetic,
    /// so `estimate(a, b)` and `estimate(b, a)` are bit-identical.
    pub fn estimate(&self, a: &Shadow, b: &Shadow) -> RiskResult<PairRisk> {
        let (lo, hi) = if a.agent <= b.agent { (a, b) } else { (b, a) };
        let pair = AgentPair::new(lo.agent, hi.agent);

        let mut best = PairRisk { pair, score: 0.0, peak_step: 0, warnings: Vec::new() };
        for (sa, sb) in lo.steps.iter().zip(&hi.steps) {
            let mu = sa.mean - sb.mean;
            let sigma = sa.covariance + sb.covariance;
            let p = self.step_probability(pair, sa.step, mu, sigma, &mut best.warnings);
            if !p.is_finite() {
                return Err(RiskError::Invariant(format!(
                    "pair {pair} step {}: non-finite risk after fallback",
                    sa.step
                )));
            }
            if p > best.score {
                best.score = p;
                best.peak_step = sa.step;
            }
        }
        best.score = best.score.clamp(0.0, 1.0);
        Ok(best)
    }

    fn step_probability(
        &self,
        pair:     AgentPair,
        step:     u32,
        mu:       Vec3,
        sigma:    Cov3,
        warnings: &mut Vec<NumericWarning>,
    ) -> f64 {
        let r = self.safe_distance;

        if sigma.iter().any(|v| !v.is_finite()) {
            self.record(pair, step, Degeneracy::NonFinite, warnings);
            return ball_probability_isotropic(mu.norm(), self.floor.sqrt(), r);
        }

        if let Some(var) = isotropic_variance(&sigma) {
            if var <= 0.0 {
                self.record(pair, step, Degeneracy::NonPositive, warnings);
                return ball_probability_isotropic(mu.norm(), self.floor.sqrt(), r);
            }
            return ball_probability_isotropic(mu.norm(), var.sqrt(), r);
        }

        let chol = match Cholesky::new(sigma) {
            Some(c) => c,
            None => {
                self.record(pair, step, Degeneracy::Regularised, warnings);
                match Cholesky::new(sigma + Cov3::identity() * self.floor) {
                    Some(c) => c,
                    None => {
                        self.record(pair, step, Degeneracy::Floored, warnings);
                        return ball_probability_isotropic(mu.norm(), self.floor.sqrt(), r);
                    }
                }
            }
        };
        self.monte_carlo(pair, step, mu, &chol)
    }

    fn monte_carlo(&self, pair: AgentPair, step: u32, mu: Vec3, chol: &Cholesky<f64, nalgebra::U3>) -> f64 {
        let l = chol.l();
        let r2 = self.safe_distance * self.safe_distance;
        let mut rng = SampleRng::for_pair_step(self.seed, pair, step);
        let rng = rng.inner();

        let mut hits = 0u32;
        for _ in 0..self.samples {
            let z = Vec3::new(
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
            );
            if (mu + l * z).norm_squared() <= r2 {
                hits += 1;
            }
        }
        hits as f64 / self.samples as f64
    }

    fn record(&self, pair: AgentPair, step: u32, kind: Degeneracy, warnings: &mut Vec<NumericWarning>) {
        warn!(pair = %pair, step, kind = kind.as_str(), "degenerate covariance sum repaired");
        warnings.push(NumericWarning { pair, step, kind });
    }
}

/// Overlap risk between two shadows with default floor, sample count and seed.
pub fn estimate_risk(a: &Shadow, b: &Shadow, safe_distance: f64) -> RiskResult<f64> {
    let estimator = RiskEstimator::new(safe_distance, f64::MAX)?;
    Ok(estimator.estimate(a, b)?.score)
}
