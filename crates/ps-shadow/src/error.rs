use ps_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShadowError {
    #[error("shadow configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ShadowResult<T> = Result<T, ShadowError>;
