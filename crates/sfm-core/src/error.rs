use thiserror::Error;

/// Errors raised while resolving a camera model from untyped input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown camera model id {0}")]
    UnknownId(i32),
    #[error("unknown camera model name {0:?}")]
    UnknownName(String),
}
