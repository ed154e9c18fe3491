//! Risk-subsystem error type.

use thiserror::Error;

use ps_core::CoreError;

/// Errors produced by `ps-risk`.
///
/// Numeric degeneracies that can be repaired are *not* errors; they are
/// recorded as [`NumericWarning`][crate::NumericWarning]s in the risk map.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk configuration error: {0}")]
    Config(String),

    /// A score stayed non-finite after every fallback.  Aborts the tick.
    #[error("risk invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type RiskResult<T> = Result<T, RiskError>;
