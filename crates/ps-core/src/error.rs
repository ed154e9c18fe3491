//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so configuration problems surface unchanged all the
//! way up to the driver.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `ps-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invalid parameter was supplied at construction time.  Fatal: no
    /// partially-built component is ever returned alongside it.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} already exists")]
    DuplicateAgent(AgentId),

    /// A runtime check that can only fail through a programming defect.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

impl CoreError {
    /// Shorthand for building a [`CoreError::Config`] from anything printable.
    pub fn config(msg: impl Into<String>) -> Self {
        CoreError::Config(msg.into())
    }
}

/// Shorthand result type for all `ps-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
