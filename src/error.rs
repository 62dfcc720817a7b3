use crate::structs::key::ObservableKey;
use thiserror::Error;

/// Errors raised while building observable stores or evaluating likelihoods
///
/// Every variant is fatal to the operation that produced it. Nothing is retried or
/// skipped, a failing key always aborts the whole evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LikelihoodError {
    /// A key required by the evaluation is not present in the store being queried
    #[error("Key {key} not found")]
    KeyNotFound { key: ObservableKey },

    /// Realization length or covariance dimension differs from what the key requires
    #[error("Shape mismatch for {key}: expected {expected}, found {found}")]
    ShapeMismatch {
        key: ObservableKey,
        expected: usize,
        found: usize,
    },

    /// The effective covariance could not be factorized
    #[error("Covariance for {key} is singular")]
    SingularCovariance { key: ObservableKey },

    /// Input data produced a non-finite likelihood contribution
    #[error("Non-finite likelihood contribution for {key}")]
    NonFinite { key: ObservableKey },

    /// Misuse at construction time
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type LikelihoodResult<T> = Result<T, LikelihoodError>;
