//! Deterministic RNG wrappers.
//!
//! # Determinism strategy
//!
//! Monte-Carlo risk sampling must be reproducible in tests and independent
//! of evaluation order, so every (agent pair, shadow step) draws from its own
//! `SmallRng` seeded by:
//!
//!   seed = risk_seed XOR (lo * MIX) XOR (hi * MIX').rotate(17) XOR (step * MIX'')
//!
//! where `lo < hi` are the canonical pair members.  This means:
//!
//! - `risk(a, b)` and `risk(b, a)` consume the identical sample stream.
//! - Pairs never share RNG state, so parallel evaluation needs no
//!   synchronisation and produces the same bits as serial evaluation.
//! - Adding agents does not disturb the streams of existing pairs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, AgentPair};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;
/// Second odd mixing constant (from SplitMix64) so `lo` and `hi` never cancel.
const MIXING_CONSTANT_2: u64 = 0xbf58_476d_1ce4_e5b9;
const MIXING_CONSTANT_3: u64 = 0x94d0_49bb_1331_11eb;

// ── SampleRng ─────────────────────────────────────────────────────────────────

/// RNG for one (pair, step) Monte-Carlo evaluation.
pub struct SampleRng(SmallRng);

impl SampleRng {
    /// Seed deterministically from the run's risk seed, a canonical pair and a
    /// shadow step index.
    pub fn for_pair_step(risk_seed: u64, pair: AgentPair, step: u32) -> Self {
        let lo = pair.lo().0 as u64;
        let hi = pair.hi().0 as u64;
        let seed = risk_seed
            ^ lo.wrapping_add(1).wrapping_mul(MIXING_CONSTANT)
            ^ hi.wrapping_add(1).wrapping_mul(MIXING_CONSTANT_2).rotate_left(17)
            ^ (step as u64).wrapping_add(1).wrapping_mul(MIXING_CONSTANT_3);
        SampleRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for scenario construction (jittered starts, random
/// goal assignment).  Never used inside a tick.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Derive a child seeded for one agent (e.g. per-agent start jitter).
    pub fn for_agent(&mut self, agent: AgentId) -> SimRng {
        self.child(agent.0 as u64)
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
