use thiserror::Error;

/// The error taxonomy surfaced by the core. No variant is retried
/// internally and none is swallowed; see the error-handling design notes
/// for the intended caller response to each kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HoleFillError {
    /// A precondition was violated at construction or while building a
    /// GPU plan (bad patch width, mismatched mask size, a forbidden
    /// consecutive `Blend`). Surfaced immediately; never retried.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A plan queue was executed whose final step was not `Blend`, or a
    /// pyramid advance was attempted past level 0 in a context that
    /// forbids it.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// Device allocation or kernel build failed on the GPU path. Callers
    /// are expected to fall back to the CPU back end.
    #[error("resource exhausted: {reason}")]
    ResourceExhausted { reason: String },

    /// A fatal, non-recoverable invariant violation (e.g. an
    /// even-dimensioned structuring element where odd is required).
    #[error("internal invariant violated: {reason}")]
    InternalInvariantViolated { reason: String },
}

pub type Result<T> = std::result::Result<T, HoleFillError>;

impl HoleFillError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        HoleFillError::InvalidInput { reason: reason.into() }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        HoleFillError::InvalidState { reason: reason.into() }
    }

    pub fn resource_exhausted(reason: impl Into<String>) -> Self {
        HoleFillError::ResourceExhausted { reason: reason.into() }
    }

    pub fn internal_invariant(reason: impl Into<String>) -> Self {
        HoleFillError::InternalInvariantViolated { reason: reason.into() }
    }
}
