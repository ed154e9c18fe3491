//! `RiskMap` and the numeric-degeneracy warnings raised while building it.

use std::collections::BTreeMap;
use std::fmt;

use ps_core::{AgentId, AgentPair};

// ── NumericWarning ────────────────────────────────────────────────────────────

/// What was wrong with a covariance sum and how it was repaired.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Degeneracy {
    /// NaN or infinite entries; replaced by `floor · I`.
    NonFinite,
    /// Isotropic variance ≤ 0; replaced by `floor · I`.
    NonPositive,
    /// Cholesky failed; retried with `Σ + floor · I`.
    Regularised,
    /// Cholesky failed even after regularisation; replaced by `floor · I`.
    Floored,
}

impl Degeneracy {
    pub fn as_str(self) -> &'static str {
        match self {
            Degeneracy::NonFinite   => "non_finite",
            Degeneracy::NonPositive => "non_positive",
            Degeneracy::Regularised => "regularised",
            Degeneracy::Floored     => "floored",
        }
    }
}

/// A repaired numeric degeneracy in one (pair, step) evaluation.
///
/// Warnings are values, not errors: the risk score is still produced from
/// the repaired covariance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericWarning {
    pub pair: AgentPair,
    pub step: u32,
    pub kind: Degeneracy,
}

impl fmt::Display for NumericWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pair {} step {}: {}", self.pair, self.step, self.kind.as_str())
    }
}

// ── RiskMap ───────────────────────────────────────────────────────────────────

/// Pairwise collision risk for the current tick.
///
/// Every unordered pair of the shadows it was built from has an entry; pruned
/// pairs hold an explicit `0.0`.  Iteration is in canonical pair order, so
/// two maps built from the same shadows iterate identically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RiskMap {
    scores:    BTreeMap<AgentPair, f64>,
    warnings:  Vec<NumericWarning>,
    evaluated: usize,
    pruned:    usize,
}

impl RiskMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_evaluated(&mut self, pair: AgentPair, score: f64) {
        self.scores.insert(pair, score);
        self.evaluated += 1;
    }

    pub(crate) fn insert_pruned(&mut self, pair: AgentPair) {
        self.scores.insert(pair, 0.0);
        self.pruned += 1;
    }

    pub(crate) fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = NumericWarning>) {
        self.warnings.extend(warnings);
    }

    /// Risk between `a` and `b`, in either order.  Unknown pairs read as 0.
    #[inline]
    pub fn get(&self, a: AgentId, b: AgentId) -> f64 {
        self.get_pair(AgentPair::new(a, b))
    }

    #[inline]
    pub fn get_pair(&self, pair: AgentPair) -> f64 {
        self.scores.get(&pair).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn contains(&self, pair: AgentPair) -> bool {
        self.scores.contains_key(&pair)
    }

    /// All entries in canonical pair order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentPair, f64)> + '_ {
        self.scores.iter().map(|(&p, &s)| (p, s))
    }

    /// Entries whose score strictly exceeds `threshold`.
    pub fn above(&self, threshold: f64) -> impl Iterator<Item = (AgentPair, f64)> + '_ {
        self.iter().filter(move |&(_, s)| s > threshold)
    }

    /// Highest risk between `agent` and any other agent accepted by `include`.
    pub fn max_for(&self, agent: AgentId, include: impl Fn(AgentId) -> bool) -> f64 {
        self.iter()
            .filter_map(|(pair, s)| pair.other(agent).filter(|&o| include(o)).map(|_| s))
            .fold(0.0, f64::max)
    }

    /// Other agents whose risk with `agent` strictly exceeds `threshold`.
    pub fn conflicts_of(&self, agent: AgentId, threshold: f64) -> Vec<AgentId> {
        self.above(threshold).filter_map(|(pair, _)| pair.other(agent)).collect()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Mean over all entries, pruned zeros included.  `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.values().sum::<f64>() / self.scores.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.scores.values().copied().fold(0.0, f64::max)
    }

    pub fn warnings(&self) -> &[NumericWarning] {
        &self.warnings
    }

    /// Number of pairs whose shadows were actually compared.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Number of pairs skipped by range/extent pruning.
    pub fn pruned(&self) -> usize {
        self.pruned
    }
}
