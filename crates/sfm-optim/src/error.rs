use thiserror::Error;

/// Errors raised while constructing cost-function handles.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CostError {
    #[error("isotropic noise stddev must be positive and finite, got {0}")]
    NonPositiveStddev(f64),
}
